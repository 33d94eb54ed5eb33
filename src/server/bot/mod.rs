//! Discord bot integration.
//!
//! The bot receives slash command interactions and member events from the Discord
//! gateway. Interactions are adapted into invocations for the command registry, and
//! member events are reconciled through the member engine. Everything the handlers
//! touch on Discord goes through a `DiscordGateway` built from the event's context.
//!
//! The bot is started during server startup and runs in its own tokio task so the
//! HTTP API isn't blocked. Its HTTP client and cache are shared with the API's gateway.
//!
//! # Gateway Intents
//!
//! The bot requires the following gateway intents:
//! - `GUILDS` - Guild, role and channel state for the cache
//! - `GUILD_MEMBERS` - Member join and update events (privileged intent)
//! - `DIRECT_MESSAGES` - Slash commands invoked in a direct message to the bot
//!
//! Note: `GUILD_MEMBERS` is a privileged intent and must be explicitly enabled
//! in the Discord Developer Portal for the bot application.

pub mod handler;
pub mod interaction;
pub mod start;
