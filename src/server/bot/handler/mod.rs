use std::sync::Arc;

use sea_orm::DatabaseConnection;
use serenity::all::{Context, EventHandler, GuildMemberUpdateEvent, Interaction, Member, Ready};
use serenity::async_trait;

use crate::server::{
    bot::interaction::handle_command, cache::cooldown::CooldownCache, command::CommandRegistry,
};

pub mod member;
pub mod ready;

/// Discord bot event handler
pub struct Handler {
    pub db: DatabaseConnection,
    pub registry: CommandRegistry,
    pub cooldown: Arc<dyn CooldownCache>,
    /// Community acted on by commands invoked in a direct message
    pub home_community_id: u64,
    pub log_channel_name: String,
}

impl Handler {
    pub fn new(
        db: DatabaseConnection,
        registry: CommandRegistry,
        cooldown: Arc<dyn CooldownCache>,
        home_community_id: u64,
        log_channel_name: impl Into<String>,
    ) -> Self {
        Self {
            db,
            registry,
            cooldown,
            home_community_id,
            log_channel_name: log_channel_name.into(),
        }
    }
}

#[async_trait]
impl EventHandler for Handler {
    /// Called when the bot is ready and connected to Discord
    async fn ready(&self, ctx: Context, ready: Ready) {
        ready::handle_ready(ctx, ready).await;
    }

    /// Called for slash commands, components and modal submissions
    ///
    /// Components and modal submissions are consumed by the collectors of the command
    /// awaiting them, so only slash commands are dispatched here.
    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        if let Interaction::Command(command) = interaction {
            handle_command(self, ctx, command).await;
        }
    }

    /// Called when a member joins a guild
    async fn guild_member_addition(&self, ctx: Context, new_member: Member) {
        member::handle_guild_member_addition(self, ctx, new_member).await;
    }

    /// Called when a member is updated in a guild (roles, nickname, etc.)
    async fn guild_member_update(
        &self,
        ctx: Context,
        old: Option<Member>,
        _new: Option<Member>,
        event: GuildMemberUpdateEvent,
    ) {
        member::handle_guild_member_update(self, ctx, old, event).await;
    }
}
