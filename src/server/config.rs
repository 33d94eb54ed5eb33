use std::{net::SocketAddr, str::FromStr};

use crate::server::error::{config::ConfigError, AppError};

const DEFAULT_API_ADDRESS: &str = "0.0.0.0:5050";
const DEFAULT_LOG_CHANNEL_NAME: &str = "bot-log";
const DEFAULT_NOTIFICATION_COOLDOWN_SECONDS: u64 = 3600;

pub struct Config {
    pub database_url: String,

    pub discord_bot_token: String,
    /// Community acted on by commands invoked in a direct message
    pub discord_guild_id: u64,

    pub api_keys: Vec<String>,
    pub api_address: SocketAddr,

    pub log_channel_name: String,
    pub notification_cooldown_seconds: u64,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        Ok(Self {
            database_url: required("DATABASE_URL")?,
            discord_bot_token: required("DISCORD_BOT_TOKEN")?,
            discord_guild_id: parse("DISCORD_GUILD_ID", required("DISCORD_GUILD_ID")?)?,
            api_keys: parse_api_keys(&required("API_KEYS")?),
            api_address: parse(
                "API_ADDRESS",
                optional("API_ADDRESS").unwrap_or_else(|| DEFAULT_API_ADDRESS.to_string()),
            )?,
            log_channel_name: optional("LOG_CHANNEL_NAME")
                .unwrap_or_else(|| DEFAULT_LOG_CHANNEL_NAME.to_string()),
            notification_cooldown_seconds: match optional("NOTIFICATION_COOLDOWN_SECONDS") {
                Some(value) => parse("NOTIFICATION_COOLDOWN_SECONDS", value)?,
                None => DEFAULT_NOTIFICATION_COOLDOWN_SECONDS,
            },
        })
    }
}

fn required(name: &str) -> Result<String, ConfigError> {
    std::env::var(name).map_err(|_| ConfigError::MissingEnvVar(name.to_string()))
}

fn optional(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.trim().is_empty())
}

fn parse<T: FromStr>(name: &str, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidEnvVar {
            name: name.to_string(),
            value,
        })
}

/// Splits the comma separated key list, dropping blank entries.
fn parse_api_keys(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|key| !key.is_empty())
        .map(str::to_string)
        .collect()
}
