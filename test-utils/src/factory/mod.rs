//! Factory methods for creating test data.
//!
//! Factories insert member records with sensible defaults, reducing boilerplate in tests.
//! Each factory has a `Factory` struct for customization and a `create_*` convenience
//! function for quick default creation.
//!
//! # Basic Usage
//!
//! ```rust,ignore
//! use test_utils::factory;
//!
//! let member = factory::create_server_member(&db).await?;
//!
//! let linked = factory::server_member::ServerMemberFactory::new(&db)
//!     .email("jane@example.com")
//!     .discord_id(123456789)
//!     .roles(&[111, 222])
//!     .build()
//!     .await?;
//! ```

pub mod helpers;
pub mod server_member;

pub use server_member::{create_linked_server_member, create_server_member};
