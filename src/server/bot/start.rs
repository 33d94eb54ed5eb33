use std::sync::Arc;

use serenity::{
    all::{Client, GatewayIntents},
    cache::Cache,
    http::Http,
};

use crate::server::{bot::handler::Handler, config::Config, error::AppError};

/// Builds the Discord bot client without connecting it.
///
/// The returned HTTP client and cache are shared with the API so both act through
/// the same connection and guild state.
///
/// # Arguments
/// - `config` - Application configuration holding the bot token
/// - `handler` - Event handler the client dispatches to
///
/// # Returns
/// - `Ok((Client, Arc<Http>, Arc<Cache>))` - Client ready to start, with its HTTP client and cache
/// - `Err(AppError)` - The client couldn't be built
pub async fn init_bot(
    config: &Config,
    handler: Handler,
) -> Result<(Client, Arc<Http>, Arc<Cache>), AppError> {
    // GUILD_MEMBERS is a privileged intent - must be enabled in Discord Developer Portal
    let intents = GatewayIntents::GUILDS
        | GatewayIntents::GUILD_MEMBERS
        | GatewayIntents::DIRECT_MESSAGES;

    let client = Client::builder(&config.discord_bot_token, intents)
        .event_handler(handler)
        .await?;

    let http = client.http.clone();
    let cache = client.cache.clone();

    Ok((client, http, cache))
}

/// Starts the Discord bot, blocking until it shuts down
///
/// Should be called from within a tokio::spawn task.
///
/// # Returns
/// - `Ok(())` if the bot ran and shut down cleanly
/// - `Err(AppError)` if the connection fails
pub async fn start_bot(mut client: Client) -> Result<(), AppError> {
    tracing::info!("Starting Discord bot...");

    client.start().await?;

    Ok(())
}
