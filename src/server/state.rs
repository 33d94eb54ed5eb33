//! Application state shared across all request handlers.
//!
//! The state is built once during startup and cloned into every request through
//! Axum's state extraction. It holds:
//! - Database connection pool backing the member store
//! - Platform gateway the member engine acts through
//! - API keys accepted by the bearer guard

use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::server::gateway::PlatformGateway;

/// Application state containing shared resources and dependencies.
///
/// All fields are cheap to clone:
/// - `DatabaseConnection` is a connection pool (clones share the pool)
/// - the gateway and the key list are reference counted
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool for the member store.
    pub db: DatabaseConnection,

    /// Gateway to the chat platform.
    ///
    /// In production this is a `DiscordGateway` sharing the bot's HTTP client and
    /// cache, so the API sees the same guild state as the bot.
    pub gateway: Arc<dyn PlatformGateway>,

    /// Bearer keys accepted by the API.
    pub api_keys: Arc<Vec<String>>,
}

impl AppState {
    /// Creates a new application state with the provided dependencies.
    ///
    /// # Arguments
    /// - `db` - Database connection pool
    /// - `gateway` - Platform gateway used by the member engine
    /// - `api_keys` - Keys accepted in the `Authorization: Bearer` header
    pub fn new(
        db: DatabaseConnection,
        gateway: Arc<dyn PlatformGateway>,
        api_keys: Vec<String>,
    ) -> Self {
        Self {
            db,
            gateway,
            api_keys: Arc::new(api_keys),
        }
    }
}
