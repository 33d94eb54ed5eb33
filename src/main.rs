mod server;

use std::{sync::Arc, time::Duration};

use crate::server::{
    bot::{self, handler::Handler},
    cache::InMemoryCooldownCache,
    command,
    config::Config,
    error::AppError,
    gateway::DiscordGateway,
    router, startup,
    state::AppState,
};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    startup::init_tracing();

    let config = Config::from_env()?;

    let db = startup::connect_to_database(&config).await?;

    // A malformed command tree aborts startup
    let registry = command::build_registry()?;
    let cooldown = Arc::new(InMemoryCooldownCache::new(Duration::from_secs(
        config.notification_cooldown_seconds,
    )));

    let handler = Handler::new(
        db.clone(),
        registry,
        cooldown,
        config.discord_guild_id,
        config.log_channel_name.clone(),
    );

    let (bot_client, discord_http, discord_cache) = bot::start::init_bot(&config, handler).await?;

    // Start Discord bot in a separate task
    tokio::spawn(async move {
        if let Err(e) = bot::start::start_bot(bot_client).await {
            tracing::error!("Discord bot error: {}", e);
        }
    });

    let gateway = Arc::new(DiscordGateway::new(
        discord_http,
        discord_cache,
        config.log_channel_name.clone(),
    ));
    let state = AppState::new(db, gateway, config.api_keys.clone());

    let listener = tokio::net::TcpListener::bind(config.api_address).await?;

    tracing::info!("Serving API on {}", config.api_address);

    axum::serve(listener, router::router(state)).await?;

    Ok(())
}
