//! Service layer for business logic and orchestration.
//!
//! This module contains the member reconciliation engine, which sits between the command,
//! controller and bot layers and the store and gateway abstractions. The engine is
//! responsible for:
//!
//! - **Linking**: Associating member records with platform accounts
//! - **Syncing**: Pushing a record's roles and derived nickname to the platform
//! - **Moderation**: Kicking, banning and unbanning with hierarchy pre-checks
//! - **Bulk Operations**: Fanning a request out over many records with per-item results
//!
//! Channel and role administration live beside it in [`channel`] and [`role`].

pub mod channel;
pub mod community;
pub mod role;
pub mod server_member;

pub use channel::ChannelService;
pub use community::CommunityScope;
pub use role::RoleService;
pub use server_member::{BanAction, ServerMemberService};

#[cfg(test)]
mod test;
