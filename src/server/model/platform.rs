//! Live platform state observed through the gateway.
//!
//! These types are snapshots of what the chat platform reports at the time of a call.
//! The platform owns their lifecycle; the bot only reads them and requests changes.

use std::collections::{BTreeMap, BTreeSet};

use serenity::all::Permissions;

use crate::server::error::fault::Fault;

/// Set of role ids, deduplicated and ordered.
pub type RoleSet = BTreeSet<u64>;

/// Maximum length of a message the platform accepts.
pub const MAX_MESSAGE_LENGTH: usize = 2000;

/// Rejects content over [`MAX_MESSAGE_LENGTH`] characters.
pub fn check_message_length(content: &str) -> Result<(), Fault> {
    let length = content.chars().count();

    if length > MAX_MESSAGE_LENGTH {
        return Err(Fault::MessageTooLong {
            limit: MAX_MESSAGE_LENGTH,
            excess: length - MAX_MESSAGE_LENGTH,
        });
    }

    Ok(())
}

/// Most recent messages the platform deletes in one bulk request.
pub const BULK_MESSAGE_DELETE_MAX: u8 = 100;

/// Role as declared in a community.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommunityRole {
    pub id: u64,
    pub name: String,
    /// Grants full administrative access to the community.
    pub administrator: bool,
    /// Grants moving members between voice channels, held by staff roles.
    pub move_members: bool,
    /// Managed by an integration and can't be assigned or removed by the bot.
    pub managed: bool,
}

/// Community (guild) snapshot with its declared roles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Community {
    pub id: u64,
    pub name: String,
    pub roles: Vec<CommunityRole>,
}

impl Community {
    /// Finds a role by id.
    pub fn role(&self, role_id: u64) -> Option<&CommunityRole> {
        self.roles.iter().find(|role| role.id == role_id)
    }

    /// Computes the role set to write for a member.
    ///
    /// Drops requested roles that no longer exist in the community or are managed by
    /// an integration, then adds back every managed role the member currently holds
    /// since the platform rejects their removal.
    ///
    /// # Arguments
    /// - `current` - Roles the member holds on the platform
    /// - `requested` - Roles the member should end up with
    ///
    /// # Returns
    /// - `RoleSet` - Roles that can be written to the platform
    pub fn writable_roles(&self, current: &RoleSet, requested: &RoleSet) -> RoleSet {
        let requested_existing = requested
            .iter()
            .filter(|role_id| matches!(self.role(**role_id), Some(role) if !role.managed));

        let kept_managed = current
            .iter()
            .filter(|role_id| matches!(self.role(**role_id), Some(role) if role.managed));

        requested_existing.chain(kept_managed).copied().collect()
    }
}

/// Member of a community as currently reported by the platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformMember {
    pub discord_id: u64,
    pub username: String,
    pub nickname: Option<String>,
    pub roles: RoleSet,
    pub is_bot: bool,
    /// The bot sits above the member in the role hierarchy.
    pub manageable: bool,
    pub kickable: bool,
    pub bannable: bool,
}

/// Entry in a community's ban list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformBan {
    pub discord_id: u64,
    pub username: String,
    pub reason: Option<String>,
}

/// Role to create in a community.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRole {
    pub name: String,
    pub colour: u32,
    pub mentionable: bool,
    /// Recorded in the community's audit log.
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelKind {
    Text,
    Category,
    /// Voice, forum, thread and other channels the bot never writes to.
    Other,
}

/// Permissions granted and denied to a role on a channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleOverwrite {
    pub role_id: u64,
    pub allow: Permissions,
    pub deny: Permissions,
}

impl RoleOverwrite {
    pub fn allow(role_id: u64, allow: Permissions) -> Self {
        Self {
            role_id,
            allow,
            deny: Permissions::empty(),
        }
    }

    pub fn deny(role_id: u64, deny: Permissions) -> Self {
        Self {
            role_id,
            allow: Permissions::empty(),
            deny,
        }
    }
}

/// Merges overwrite lists, a later overwrite for a role replacing an earlier one.
///
/// The result is ordered by role id so the same inputs always produce the same request.
pub fn merge_overwrites(overwrites: impl IntoIterator<Item = RoleOverwrite>) -> Vec<RoleOverwrite> {
    overwrites
        .into_iter()
        .map(|overwrite| (overwrite.role_id, overwrite))
        .collect::<BTreeMap<_, _>>()
        .into_values()
        .collect()
}

/// Channel of a community.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformChannel {
    pub id: u64,
    pub community_id: u64,
    pub name: String,
    pub kind: ChannelKind,
    /// Category the channel sits under.
    pub parent_id: Option<u64>,
    /// Role overwrites; member overwrites are left out.
    pub overwrites: Vec<RoleOverwrite>,
}

/// Channel to create in a community.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewChannel {
    pub name: String,
    pub kind: ChannelKind,
    pub parent_id: Option<u64>,
    pub overwrites: Vec<RoleOverwrite>,
}
