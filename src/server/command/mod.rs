//! Slash command composition and dispatch.
//!
//! Commands are declared as a tree (command, optional subcommand group, subcommand) with
//! validating builders in [`definition`], collected into a [`registry::CommandRegistry`]
//! at startup, and dispatched per interaction. The concrete `user`, `member`, `channel`,
//! `role` and `message` trees are declared in their own modules.

pub mod channel;
pub mod definition;
pub mod format;
pub mod invocation;
pub mod member;
pub mod message;
pub mod registry;
pub mod reply;
pub mod role;
pub mod user;

use crate::server::{
    data::store::MemberStore,
    error::{command::CommandBuildError, fault::Fault, AppError},
    gateway::PlatformGateway,
    service::{
        community::CommunityScope, server_member::ServerMemberService, ChannelService,
        RoleService,
    },
};

pub use registry::CommandRegistry;

/// Dependencies shared by every command handler.
pub struct CommandContext<'a> {
    pub store: &'a dyn MemberStore,
    pub gateway: &'a dyn PlatformGateway,
    /// Community that direct-message commands act on.
    pub home_community_id: u64,
}

impl<'a> CommandContext<'a> {
    /// Reconciliation engine bound to `scope`.
    pub fn engine<'s>(&'s self, scope: &'s CommunityScope) -> ServerMemberService<'s> {
        ServerMemberService::new(self.store, self.gateway, scope)
    }

    pub fn channels<'s>(&'s self, scope: &'s CommunityScope) -> ChannelService<'s> {
        ChannelService::new(self.gateway, scope)
    }

    pub fn roles<'s>(&'s self, scope: &'s CommunityScope) -> RoleService<'s> {
        RoleService::new(self.gateway, scope)
    }

    /// Loads a community scope for a handler.
    ///
    /// Missing key roles are a setup problem of the community, reported to the invoker
    /// as a setup fault.
    pub async fn load_scope(&self, community_id: u64) -> Result<CommunityScope, Fault> {
        CommunityScope::load(self.gateway, community_id)
            .await
            .map_err(|err| match err {
                AppError::Fault(fault) => fault,
                AppError::TaxonomyErr(e) => Fault::SlashCommandSetup(e.to_string()),
                e => Fault::unidentified(e),
            })
    }
}

/// Builds the registry holding every command the bot serves.
///
/// # Returns
/// - `Ok(CommandRegistry)` - Every tree is valid
/// - `Err(CommandBuildError)` - A tree is malformed, which must abort startup
pub fn build_registry() -> Result<CommandRegistry, CommandBuildError> {
    CommandRegistry::new(vec![
        user::command()?,
        member::command()?,
        channel::command()?,
        role::command()?,
        message::command()?,
    ])
}

#[cfg(test)]
mod test;
