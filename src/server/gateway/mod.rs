//! Platform gateway abstraction over the chat platform.
//!
//! The reconciliation engine never talks to Discord directly. It observes communities and
//! members, and requests changes, through the `PlatformGateway` trait. `DiscordGateway` is
//! the serenity-backed implementation used at runtime; tests use a recording fake.

pub mod discord;

#[cfg(test)]
pub mod fake;

use async_trait::async_trait;

use crate::server::{
    error::fault::Fault,
    model::platform::{
        Community, CommunityRole, NewChannel, NewRole, PlatformBan, PlatformChannel,
        PlatformMember, RoleSet,
    },
};

pub use discord::DiscordGateway;

/// Messages sent within this many seconds before a ban are deleted with it.
pub const BAN_DELETE_MESSAGE_SECONDS: u32 = 86_400;

/// Read and write access to live platform state.
///
/// Member and role methods are scoped to a community (guild) id. Direct messages go to a
/// user regardless of community, and channel writes address the channel by its own id.
#[async_trait]
pub trait PlatformGateway: Send + Sync {
    /// Fetches a community snapshot with its roles.
    ///
    /// # Returns
    /// - `Ok(Community)` - Community resolved
    /// - `Err(Fault::CommunityNotCached)` - The bot can't see the community
    async fn fetch_community(&self, community_id: u64) -> Result<Community, Fault>;

    /// Fetches a member, `Ok(None)` when the user isn't in the community.
    async fn fetch_member(
        &self,
        community_id: u64,
        discord_id: u64,
    ) -> Result<Option<PlatformMember>, Fault>;

    /// Looks a user up in the community's ban list.
    async fn find_ban(
        &self,
        community_id: u64,
        discord_id: u64,
    ) -> Result<Option<PlatformBan>, Fault>;

    async fn kick(
        &self,
        community_id: u64,
        discord_id: u64,
        reason: Option<&str>,
    ) -> Result<(), Fault>;

    /// Bans a user, deleting their messages from the preceding
    /// [`BAN_DELETE_MESSAGE_SECONDS`].
    async fn ban(
        &self,
        community_id: u64,
        discord_id: u64,
        reason: Option<&str>,
    ) -> Result<(), Fault>;

    async fn unban(&self, community_id: u64, discord_id: u64) -> Result<(), Fault>;

    /// Replaces the member's roles with `roles`.
    ///
    /// Callers compute the set with [`Community::writable_roles`] so managed roles are kept.
    async fn set_roles(
        &self,
        community_id: u64,
        discord_id: u64,
        roles: &RoleSet,
    ) -> Result<(), Fault>;

    async fn set_nickname(
        &self,
        community_id: u64,
        discord_id: u64,
        nickname: &str,
    ) -> Result<(), Fault>;

    async fn send_dm(&self, discord_id: u64, content: &str) -> Result<(), Fault>;

    /// Posts to the community's bot log channel.
    ///
    /// Returns `Ok(false)` when the community has no log channel.
    async fn send_to_log_channel(&self, community_id: u64, content: &str)
        -> Result<bool, Fault>;

    /// Fetches a channel of the community, `Ok(None)` when it doesn't exist there.
    async fn fetch_channel(
        &self,
        community_id: u64,
        channel_id: u64,
    ) -> Result<Option<PlatformChannel>, Fault>;

    /// Creates a text channel or a category with the given role overwrites.
    ///
    /// # Returns
    /// - `Ok(PlatformChannel)` - The created channel
    /// - `Err(Fault::ChannelCreateFailed)` - The platform refused the channel
    async fn create_channel(
        &self,
        community_id: u64,
        channel: &NewChannel,
    ) -> Result<PlatformChannel, Fault>;

    async fn delete_channel(&self, channel_id: u64) -> Result<(), Fault>;

    async fn create_role(&self, community_id: u64, role: &NewRole) -> Result<CommunityRole, Fault>;

    async fn delete_role(&self, community_id: u64, role_id: u64) -> Result<(), Fault>;

    async fn send_to_channel(&self, channel_id: u64, content: &str) -> Result<(), Fault>;

    /// Deletes up to `count` of the channel's most recent messages.
    ///
    /// Returns how many messages were deleted, which is less than `count` when the channel
    /// holds fewer messages.
    async fn delete_recent_messages(&self, channel_id: u64, count: u8) -> Result<usize, Fault>;
}
