use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use sea_orm::DatabaseConnection;
use serde_json::{json, Value};
use tower::ServiceExt;

use crate::server::{
    error::fault::Fault,
    gateway::fake::{FakeGateway, GatewayCall},
    policy::test_support::{community_with_key_roles, role_id},
    router::router,
    state::AppState,
};
use test_utils::{builder::TestBuilder, factory::server_member::ServerMemberFactory};


const API_KEY: &str = "test-key";
const BASE: &str = "/api/discord/guilds/1/servermembers";

fn app(db: &DatabaseConnection, gateway: Arc<FakeGateway>) -> Router {
    router(AppState::new(db.clone(), gateway, vec![API_KEY.to_string()]))
}

fn request(method: Method, uri: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", API_KEY));

    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

/// Sends a request and returns the status with the decoded JSON body, `Null` when empty.
async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();

    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };

    (status, body)
}
