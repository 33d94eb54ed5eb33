//! Test factories for creating Serenity API objects.
//!
//! These factories create valid Serenity structs by deserializing JSON, simulating what
//! Discord's API would return, so conversions from Serenity models can be tested without
//! a gateway connection.
//!
//! # Usage
//!
//! ```rust,ignore
//! use test_utils::serenity::{create_test_member, create_test_role};
//!
//! let staff = create_test_role(111111111, "staff", 5, Permissions::MOVE_MEMBERS.bits());
//! let member = create_test_member(123456789, "jane", Some("Jane_Doe"), &[111111111]);
//! ```
//!
//! # Available Factories
//!
//! - `role::create_test_role` - Create Serenity Role objects
//! - `role::create_test_managed_role` - Create integration-managed Role objects
//! - `member::create_test_member` - Create Serenity Member objects
//! - `channel::create_test_channel` - Create Serenity GuildChannel objects

pub mod channel;
pub mod member;
pub mod role;

pub use channel::create_test_channel;
pub use member::{create_test_bot_member, create_test_member};
pub use role::{create_test_managed_role, create_test_role};
