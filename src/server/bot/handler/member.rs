//! Member join and update events.
//!
//! The serenity-facing handlers skip bots and unchanged roles, then hand the member's id
//! to the platform-neutral `member_joined` / `member_roles_changed`, which reconcile the
//! record through the engine. Failures are logged and posted to the community's log
//! channel instead of being propagated out of the event callback.

use serenity::all::{Context, GuildMemberUpdateEvent, Member, RoleId};

use crate::server::{
    bot::handler::Handler,
    cache::cooldown::{CooldownCache, CooldownKey},
    data::{store::MemberStore, ServerMemberRepository},
    error::fault::Fault,
    gateway::{DiscordGateway, PlatformGateway},
    model::platform::PlatformMember,
    service::{community::CommunityScope, server_member::ServerMemberService},
};

/// Direct message sent to members that joined without a linked record.
pub const LINK_INSTRUCTIONS: &str = "Welcome! Your discord account isn't linked to your enrollment yet. Send me `/member update link-discord-account` here with the email you enrolled with to get access.";

/// Handles the guild_member_addition event when a member joins a guild
pub async fn handle_guild_member_addition(handler: &Handler, ctx: Context, new_member: Member) {
    if new_member.user.bot {
        return;
    }

    let store = ServerMemberRepository::new(&handler.db);
    let gateway = DiscordGateway::new(
        ctx.http.clone(),
        ctx.cache.clone(),
        handler.log_channel_name.clone(),
    );

    member_joined(
        &store,
        &gateway,
        handler.cooldown.as_ref(),
        new_member.guild_id.get(),
        new_member.user.id.get(),
    )
    .await;
}

/// Handles the guild_member_update event, acting only when the member's roles changed
pub async fn handle_guild_member_update(
    handler: &Handler,
    ctx: Context,
    old: Option<Member>,
    event: GuildMemberUpdateEvent,
) {
    if event.user.bot {
        return;
    }

    // Without the previous state every update is treated as a possible role change;
    // the engine skips the write when nothing differs.
    if let Some(old) = old {
        if !roles_changed(&old.roles, &event.roles) {
            return;
        }
    }

    let store = ServerMemberRepository::new(&handler.db);
    let gateway = DiscordGateway::new(
        ctx.http.clone(),
        ctx.cache.clone(),
        handler.log_channel_name.clone(),
    );

    member_roles_changed(&store, &gateway, event.guild_id.get(), event.user.id.get()).await;
}

fn roles_changed(old: &[RoleId], new: &[RoleId]) -> bool {
    let mut old = old.to_vec();
    let mut new = new.to_vec();
    old.sort();
    new.sort();

    old != new
}

/// Posts a message to the community's log channel, falling back to the process log.
pub async fn report(gateway: &dyn PlatformGateway, community_id: u64, message: &str) {
    match gateway.send_to_log_channel(community_id, message).await {
        Ok(true) => {}
        Ok(false) => tracing::warn!(
            "No log channel in guild {}, dropped report: {}",
            community_id,
            message
        ),
        Err(e) => tracing::error!("Failed to post to log channel of guild {}: {}", community_id, e),
    }
}

/// Loads the scope and live member an event refers to, reporting what can't be loaded.
async fn load_event_member(
    gateway: &dyn PlatformGateway,
    community_id: u64,
    discord_id: u64,
) -> Option<(CommunityScope, PlatformMember)> {
    let scope = match CommunityScope::load(gateway, community_id).await {
        Ok(scope) => scope,
        Err(e) => {
            tracing::error!("Failed to load guild {}: {}", community_id, e);
            report(gateway, community_id, &e.to_string()).await;
            return None;
        }
    };

    match gateway.fetch_member(community_id, discord_id).await {
        Ok(Some(member)) => Some((scope, member)),
        Ok(None) => {
            tracing::debug!(
                "Member {} left guild {} before the event was handled",
                discord_id,
                community_id
            );
            None
        }
        Err(e) => {
            tracing::error!("Failed to fetch member {}: {}", discord_id, e);
            report(gateway, community_id, &e.to_string()).await;
            None
        }
    }
}

/// Syncs a member that joined, or asks them to link their account.
///
/// Link instructions are sent at most once per member and community within the
/// cooldown window.
pub async fn member_joined(
    store: &dyn MemberStore,
    gateway: &dyn PlatformGateway,
    cooldown: &dyn CooldownCache,
    community_id: u64,
    discord_id: u64,
) {
    let Some((scope, member)) = load_event_member(gateway, community_id, discord_id).await else {
        return;
    };

    let service = ServerMemberService::new(store, gateway, &scope);

    match service.handle_member_joined(&member).await {
        Ok(record) => {
            tracing::info!("Synced {} after joining guild {}", record.email, community_id);
        }
        Err(Fault::NotLinkedButInGuild { .. }) => {
            let key = CooldownKey {
                member_id: discord_id,
                resource_id: community_id,
            };

            if !cooldown.try_acquire(&key).await {
                tracing::debug!("Link instructions to {} are on cooldown", discord_id);
                return;
            }

            if let Err(e) = gateway.send_dm(discord_id, LINK_INSTRUCTIONS).await {
                tracing::warn!("Failed to send link instructions to {}: {}", discord_id, e);
                report(
                    gateway,
                    community_id,
                    &format!(
                        "Couldn't send link instructions to <@{}>. {}",
                        discord_id, e
                    ),
                )
                .await;
            }
        }
        Err(fault) => {
            tracing::error!("Failed to sync joining member {}: {}", discord_id, fault);
            report(gateway, community_id, &fault.to_string()).await;
        }
    }
}

/// Copies a member's changed platform roles to their record.
pub async fn member_roles_changed(
    store: &dyn MemberStore,
    gateway: &dyn PlatformGateway,
    community_id: u64,
    discord_id: u64,
) {
    let Some((scope, member)) = load_event_member(gateway, community_id, discord_id).await else {
        return;
    };

    let service = ServerMemberService::new(store, gateway, &scope);

    if let Err(fault) = service.handle_member_roles_changed(&member).await {
        tracing::error!(
            "Failed to store role change of member {}: {}",
            discord_id,
            fault
        );
        report(gateway, community_id, &fault.to_string()).await;
    }
}
