use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::server::{
    controller::server_member, middleware::api_key::require_api_key, state::AppState,
};

const SERVER_MEMBERS: &str = "/api/discord/guilds/{guild_id}/servermembers";

fn path(suffix: &str) -> String {
    format!("{}{}", SERVER_MEMBERS, suffix)
}

/// Builds the API router, every route guarded by the bearer key middleware.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route(SERVER_MEMBERS, post(server_member::create_one))
        .route(&path("/many"), post(server_member::create_many))
        .route(&path("/find-many"), post(server_member::find_many))
        .route(
            &path("/direct-message-many"),
            post(server_member::direct_message_many),
        )
        .route(&path("/kick-many"), put(server_member::kick_many))
        .route(
            &path("/roles/{method}"),
            put(server_member::update_many_roles),
        )
        .route(&path("/{identifier}/ban"), put(server_member::ban))
        .route(&path("/{identifier}/unban"), put(server_member::unban))
        .route(
            &path("/{identifier}/sync-linked-discord-account"),
            put(server_member::sync_linked),
        )
        .route(
            &path("/{identifier}/and-update-linked-guild-member"),
            put(server_member::update_and_sync),
        )
        .route(
            &path("/{identifier}/link-discord-account/{discord_id}"),
            put(server_member::link),
        )
        .route(
            &path("/{identifier}/unlink-discord-account"),
            put(server_member::unlink),
        )
        .route(
            &path("/{identifier}"),
            get(server_member::find_one)
                .put(server_member::update_one)
                .delete(server_member::delete_one),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_api_key,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
