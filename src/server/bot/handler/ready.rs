//! Ready event handler.
//!
//! Fired once per gateway connection after the initial handshake.

use serenity::all::{Context, Ready};

/// Handles the ready event when the bot connects to Discord.
///
/// # Arguments
/// - `ctx` - Discord context, unused
/// - `ready` - Ready event data containing the bot user and its guilds
pub async fn handle_ready(_ctx: Context, ready: Ready) {
    tracing::info!(
        "{} is connected to Discord in {} guild(s)",
        ready.user.name,
        ready.guilds.len()
    );
}
