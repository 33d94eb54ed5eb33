//! Serenity-backed platform gateway.
//!
//! Reads community and member state from the serenity cache, falling back to the HTTP API
//! for members that aren't cached, and issues every write through the shared `Http` client.
//! Cache references are never held across an await since they lock the underlying map.

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use serenity::{
    all::{
        Cache, Channel, ChannelId, ChannelType, CreateChannel, EditMember, EditRole,
        GetMessages, GuildChannel, GuildId, Http, Member, MessageId, PermissionOverwrite,
        PermissionOverwriteType, Permissions, Role, RoleId, UserId,
    },
    http::HttpError,
};

use crate::server::{
    error::fault::Fault,
    gateway::{PlatformGateway, BAN_DELETE_MESSAGE_SECONDS},
    model::platform::{
        ChannelKind, Community, CommunityRole, NewChannel, NewRole, PlatformBan,
        PlatformChannel, PlatformMember, RoleOverwrite, RoleSet,
    },
};

/// What the bot is allowed to do to a member given the role hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Capabilities {
    pub manageable: bool,
    pub kickable: bool,
    pub bannable: bool,
}

/// The bot's standing in a guild's role hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hierarchy {
    pub owner_id: u64,
    pub bot_id: u64,
    pub bot_position: u16,
    pub bot_permissions: Permissions,
}

impl Hierarchy {
    /// Computes the bot's hierarchy position and permissions from its member entry.
    ///
    /// # Arguments
    /// - `guild_id` - Guild id, which is also the id of the `@everyone` role
    /// - `owner_id` - Guild owner, who can never be managed
    /// - `roles` - Every role of the guild
    /// - `bot` - The bot's own member entry
    pub fn new(
        guild_id: GuildId,
        owner_id: UserId,
        roles: &HashMap<RoleId, Role>,
        bot: &Member,
    ) -> Self {
        let everyone = RoleId::new(guild_id.get());

        let bot_permissions = roles
            .get(&everyone)
            .into_iter()
            .chain(bot.roles.iter().filter_map(|role_id| roles.get(role_id)))
            .fold(Permissions::empty(), |acc, role| acc | role.permissions);

        Self {
            owner_id: owner_id.get(),
            bot_id: bot.user.id.get(),
            bot_position: highest_position(roles, &bot.roles),
            bot_permissions,
        }
    }

    fn has(&self, permission: Permissions) -> bool {
        self.bot_permissions.contains(Permissions::ADMINISTRATOR)
            || self.bot_permissions.contains(permission)
    }

    /// Capabilities of the bot against `member`.
    ///
    /// A member is manageable when it isn't the owner or the bot itself and its highest
    /// role sits strictly below the bot's highest role.
    pub fn capabilities(&self, roles: &HashMap<RoleId, Role>, member: &Member) -> Capabilities {
        let discord_id = member.user.id.get();

        let manageable = discord_id != self.owner_id
            && discord_id != self.bot_id
            && highest_position(roles, &member.roles) < self.bot_position;

        Capabilities {
            manageable,
            kickable: manageable && self.has(Permissions::KICK_MEMBERS),
            bannable: manageable && self.has(Permissions::BAN_MEMBERS),
        }
    }
}

/// Highest position among the given roles, 0 when none resolve.
pub fn highest_position(roles: &HashMap<RoleId, Role>, member_roles: &[RoleId]) -> u16 {
    member_roles
        .iter()
        .filter_map(|role_id| roles.get(role_id))
        .map(|role| role.position)
        .max()
        .unwrap_or(0)
}

pub fn community_role_from_role(role: &Role) -> CommunityRole {
    CommunityRole {
        id: role.id.get(),
        name: role.name.clone(),
        administrator: role.permissions.contains(Permissions::ADMINISTRATOR),
        move_members: role.permissions.contains(Permissions::MOVE_MEMBERS),
        managed: role.managed,
    }
}

/// Builds a community snapshot, roles ordered from the top of the hierarchy down.
pub fn community_from_roles<'a>(
    id: u64,
    name: &str,
    roles: impl IntoIterator<Item = &'a Role>,
) -> Community {
    let mut roles: Vec<&Role> = roles.into_iter().collect();
    roles.sort_by(|a, b| b.position.cmp(&a.position).then(a.id.cmp(&b.id)));

    Community {
        id,
        name: name.to_string(),
        roles: roles.into_iter().map(community_role_from_role).collect(),
    }
}

pub fn platform_member_from_member(member: &Member, capabilities: Capabilities) -> PlatformMember {
    PlatformMember {
        discord_id: member.user.id.get(),
        username: member.user.name.clone(),
        nickname: member.nick.clone(),
        roles: member.roles.iter().map(|role_id| role_id.get()).collect(),
        is_bot: member.user.bot,
        manageable: capabilities.manageable,
        kickable: capabilities.kickable,
        bannable: capabilities.bannable,
    }
}

pub fn platform_channel_from_channel(channel: &GuildChannel) -> PlatformChannel {
    let kind = match channel.kind {
        ChannelType::Text => ChannelKind::Text,
        ChannelType::Category => ChannelKind::Category,
        _ => ChannelKind::Other,
    };

    let overwrites = channel
        .permission_overwrites
        .iter()
        .filter_map(|overwrite| match overwrite.kind {
            PermissionOverwriteType::Role(role_id) => Some(RoleOverwrite {
                role_id: role_id.get(),
                allow: overwrite.allow,
                deny: overwrite.deny,
            }),
            _ => None,
        })
        .collect();

    PlatformChannel {
        id: channel.id.get(),
        community_id: channel.guild_id.get(),
        name: channel.name.clone(),
        kind,
        parent_id: channel.parent_id.map(|id| id.get()),
        overwrites,
    }
}

fn permission_overwrite(overwrite: &RoleOverwrite) -> PermissionOverwrite {
    PermissionOverwrite {
        allow: overwrite.allow,
        deny: overwrite.deny,
        kind: PermissionOverwriteType::Role(RoleId::new(overwrite.role_id)),
    }
}

fn is_not_found(err: &serenity::Error) -> bool {
    matches!(
        err,
        serenity::Error::Http(HttpError::UnsuccessfulRequest(response))
            if response.status_code.as_u16() == 404
    )
}

/// Platform gateway over a serenity HTTP client and cache.
#[derive(Clone)]
pub struct DiscordGateway {
    http: Arc<Http>,
    cache: Arc<Cache>,
    log_channel_name: String,
}

impl DiscordGateway {
    /// Creates a new DiscordGateway instance.
    ///
    /// # Arguments
    /// - `http` - Shared serenity HTTP client
    /// - `cache` - Shared serenity cache populated by the bot's gateway connection
    /// - `log_channel_name` - Name of the channel bot events are logged to
    pub fn new(http: Arc<Http>, cache: Arc<Cache>, log_channel_name: impl Into<String>) -> Self {
        Self {
            http,
            cache,
            log_channel_name: log_channel_name.into(),
        }
    }

    /// Fetches a member from the cache, then from the API.
    async fn guild_member(
        &self,
        guild_id: GuildId,
        user_id: UserId,
    ) -> Result<Option<Member>, Fault> {
        let cached = self
            .cache
            .guild(guild_id)
            .and_then(|guild| guild.members.get(&user_id).cloned());

        if let Some(member) = cached {
            return Ok(Some(member));
        }

        match self.http.get_member(guild_id, user_id).await {
            Ok(member) => Ok(Some(member)),
            Err(e) if is_not_found(&e) => Ok(None),
            Err(e) => Err(Fault::unidentified(e)),
        }
    }

    fn guild_roles(&self, guild_id: GuildId) -> Result<(UserId, HashMap<RoleId, Role>), Fault> {
        let guild = self
            .cache
            .guild(guild_id)
            .ok_or(Fault::CommunityNotCached(guild_id.get()))?;

        Ok((guild.owner_id, guild.roles.clone()))
    }
}

#[async_trait]
impl PlatformGateway for DiscordGateway {
    async fn fetch_community(&self, community_id: u64) -> Result<Community, Fault> {
        let guild = self
            .cache
            .guild(GuildId::new(community_id))
            .ok_or(Fault::CommunityNotCached(community_id))?;

        Ok(community_from_roles(
            community_id,
            &guild.name,
            guild.roles.values(),
        ))
    }

    async fn fetch_member(
        &self,
        community_id: u64,
        discord_id: u64,
    ) -> Result<Option<PlatformMember>, Fault> {
        let guild_id = GuildId::new(community_id);

        let Some(member) = self.guild_member(guild_id, UserId::new(discord_id)).await? else {
            return Ok(None);
        };

        let bot_id = self.cache.current_user().id;
        let bot = self
            .guild_member(guild_id, bot_id)
            .await?
            .ok_or(Fault::MemberNotInGuild(bot_id.get()))?;

        let (owner_id, roles) = self.guild_roles(guild_id)?;
        let hierarchy = Hierarchy::new(guild_id, owner_id, &roles, &bot);

        Ok(Some(platform_member_from_member(
            &member,
            hierarchy.capabilities(&roles, &member),
        )))
    }

    async fn find_ban(
        &self,
        community_id: u64,
        discord_id: u64,
    ) -> Result<Option<PlatformBan>, Fault> {
        let bans = self
            .http
            .get_bans(GuildId::new(community_id), None, None)
            .await
            .map_err(|e| Fault::BanFetchFailed(e.to_string()))?;

        Ok(bans
            .into_iter()
            .find(|ban| ban.user.id.get() == discord_id)
            .map(|ban| PlatformBan {
                discord_id,
                username: ban.user.name,
                reason: ban.reason,
            }))
    }

    async fn kick(
        &self,
        community_id: u64,
        discord_id: u64,
        reason: Option<&str>,
    ) -> Result<(), Fault> {
        let guild_id = GuildId::new(community_id);
        let user_id = UserId::new(discord_id);

        let result = match reason {
            Some(reason) => guild_id.kick_with_reason(&self.http, user_id, reason).await,
            None => guild_id.kick(&self.http, user_id).await,
        };

        result.map_err(|e| Fault::KickFailed {
            discord_id,
            reason: e.to_string(),
        })
    }

    async fn ban(
        &self,
        community_id: u64,
        discord_id: u64,
        reason: Option<&str>,
    ) -> Result<(), Fault> {
        let guild_id = GuildId::new(community_id);
        let user_id = UserId::new(discord_id);
        let delete_message_days = (BAN_DELETE_MESSAGE_SECONDS / 86_400) as u8;

        let result = match reason {
            Some(reason) => {
                guild_id
                    .ban_with_reason(&self.http, user_id, delete_message_days, reason)
                    .await
            }
            None => guild_id.ban(&self.http, user_id, delete_message_days).await,
        };

        result.map_err(|e| Fault::BanFailed {
            discord_id,
            reason: e.to_string(),
        })
    }

    async fn unban(&self, community_id: u64, discord_id: u64) -> Result<(), Fault> {
        GuildId::new(community_id)
            .unban(&self.http, UserId::new(discord_id))
            .await
            .map_err(|e| Fault::UnbanFailed(e.to_string()))
    }

    async fn set_roles(
        &self,
        community_id: u64,
        discord_id: u64,
        roles: &RoleSet,
    ) -> Result<(), Fault> {
        let builder = EditMember::new().roles(roles.iter().map(|role_id| RoleId::new(*role_id)));

        GuildId::new(community_id)
            .edit_member(&*self.http, UserId::new(discord_id), builder)
            .await
            .map(|_| ())
            .map_err(|e| Fault::RolesUpdateFailed {
                discord_id,
                reason: e.to_string(),
            })
    }

    async fn set_nickname(
        &self,
        community_id: u64,
        discord_id: u64,
        nickname: &str,
    ) -> Result<(), Fault> {
        GuildId::new(community_id)
            .edit_member(
                &*self.http,
                UserId::new(discord_id),
                EditMember::new().nickname(nickname),
            )
            .await
            .map(|_| ())
            .map_err(|e| Fault::NicknameUpdateFailed {
                discord_id,
                reason: e.to_string(),
            })
    }

    async fn send_dm(&self, discord_id: u64, content: &str) -> Result<(), Fault> {
        let channel = UserId::new(discord_id)
            .create_dm_channel(&*self.http)
            .await
            .map_err(|e| Fault::DirectMessageFailed(e.to_string()))?;

        channel
            .id
            .say(&self.http, content)
            .await
            .map(|_| ())
            .map_err(|e| Fault::DirectMessageFailed(e.to_string()))
    }

    async fn send_to_log_channel(
        &self,
        community_id: u64,
        content: &str,
    ) -> Result<bool, Fault> {
        let channel_id: Option<ChannelId> = {
            let guild = self
                .cache
                .guild(GuildId::new(community_id))
                .ok_or(Fault::CommunityNotCached(community_id))?;

            guild
                .channels
                .values()
                .find(|channel| channel.name.eq_ignore_ascii_case(&self.log_channel_name))
                .map(|channel| channel.id)
        };

        let Some(channel_id) = channel_id else {
            return Ok(false);
        };

        channel_id
            .say(&self.http, content)
            .await
            .map_err(Fault::unidentified)?;

        Ok(true)
    }

    async fn fetch_channel(
        &self,
        community_id: u64,
        channel_id: u64,
    ) -> Result<Option<PlatformChannel>, Fault> {
        let cached = self.cache.guild(GuildId::new(community_id)).and_then(|guild| {
            guild
                .channels
                .get(&ChannelId::new(channel_id))
                .map(platform_channel_from_channel)
        });

        if cached.is_some() {
            return Ok(cached);
        }

        match self.http.get_channel(ChannelId::new(channel_id)).await {
            Ok(Channel::Guild(channel)) if channel.guild_id.get() == community_id => {
                Ok(Some(platform_channel_from_channel(&channel)))
            }
            Ok(_) => Ok(None),
            Err(e) if is_not_found(&e) => Ok(None),
            Err(e) => Err(Fault::unidentified(e)),
        }
    }

    async fn create_channel(
        &self,
        community_id: u64,
        channel: &NewChannel,
    ) -> Result<PlatformChannel, Fault> {
        let kind = match channel.kind {
            ChannelKind::Category => ChannelType::Category,
            ChannelKind::Text | ChannelKind::Other => ChannelType::Text,
        };

        let mut builder = CreateChannel::new(channel.name.as_str())
            .kind(kind)
            .permissions(channel.overwrites.iter().map(permission_overwrite));
        if let Some(parent_id) = channel.parent_id {
            builder = builder.category(ChannelId::new(parent_id));
        }

        GuildId::new(community_id)
            .create_channel(&*self.http, builder)
            .await
            .map(|created| platform_channel_from_channel(&created))
            .map_err(|e| Fault::ChannelCreateFailed(e.to_string()))
    }

    async fn delete_channel(&self, channel_id: u64) -> Result<(), Fault> {
        ChannelId::new(channel_id)
            .delete(&*self.http)
            .await
            .map(|_| ())
            .map_err(|e| Fault::ChannelDeleteFailed {
                channel_id,
                reason: e.to_string(),
            })
    }

    async fn create_role(&self, community_id: u64, role: &NewRole) -> Result<CommunityRole, Fault> {
        let mut builder = EditRole::new()
            .name(role.name.as_str())
            .colour(role.colour)
            .mentionable(role.mentionable);
        if let Some(reason) = role.reason.as_deref() {
            builder = builder.audit_log_reason(reason);
        }

        GuildId::new(community_id)
            .create_role(&*self.http, builder)
            .await
            .map(|created| community_role_from_role(&created))
            .map_err(|e| Fault::RoleCreateFailed(e.to_string()))
    }

    async fn delete_role(&self, community_id: u64, role_id: u64) -> Result<(), Fault> {
        GuildId::new(community_id)
            .delete_role(&self.http, RoleId::new(role_id))
            .await
            .map_err(|e| Fault::RoleDeleteFailed {
                role_id,
                reason: e.to_string(),
            })
    }

    async fn send_to_channel(&self, channel_id: u64, content: &str) -> Result<(), Fault> {
        ChannelId::new(channel_id)
            .say(&self.http, content)
            .await
            .map(|_| ())
            .map_err(|e| Fault::ChannelSendFailed {
                channel_id,
                reason: e.to_string(),
            })
    }

    async fn delete_recent_messages(&self, channel_id: u64, count: u8) -> Result<usize, Fault> {
        let channel = ChannelId::new(channel_id);
        let to_fault = move |e: serenity::Error| Fault::MessageDeleteFailed {
            channel_id,
            reason: e.to_string(),
        };

        let ids: Vec<MessageId> = channel
            .messages(&*self.http, GetMessages::new().limit(count))
            .await
            .map_err(to_fault)?
            .iter()
            .map(|message| message.id)
            .collect();

        // The bulk endpoint only accepts between 2 and 100 ids.
        match ids.as_slice() {
            [] => {}
            [id] => channel.delete_message(&self.http, *id).await.map_err(to_fault)?,
            _ => channel.delete_messages(&self.http, &ids).await.map_err(to_fault)?,
        }

        Ok(ids.len())
    }
}
