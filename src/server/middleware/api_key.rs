use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::server::{error::AppError, state::AppState};

const BEARER_PREFIX: &str = "Bearer ";

/// Checks the bearer key of a request against the configured API keys.
pub struct ApiKeyGuard<'a> {
    keys: &'a [String],
    headers: &'a HeaderMap,
}

impl<'a> ApiKeyGuard<'a> {
    pub fn new(keys: &'a [String], headers: &'a HeaderMap) -> Self {
        Self { keys, headers }
    }

    /// Requires a known key in the `Authorization: Bearer <key>` header.
    ///
    /// # Returns
    /// - `Ok(())` - The request carries an accepted key
    /// - `Err(AppError::Unauthorized)` - The header is missing, malformed or the key is unknown
    pub fn require(&self) -> Result<(), AppError> {
        let Some(header) = self.headers.get(AUTHORIZATION) else {
            return Err(AppError::Unauthorized(
                "Missing Authorization header.".to_string(),
            ));
        };

        let key = header
            .to_str()
            .ok()
            .and_then(|value| value.strip_prefix(BEARER_PREFIX))
            .map(str::trim)
            .ok_or_else(|| {
                AppError::Unauthorized("Authorization header must be a bearer key.".to_string())
            })?;

        if key.is_empty() || !self.keys.iter().any(|accepted| accepted == key) {
            return Err(AppError::Unauthorized("Invalid API key.".to_string()));
        }

        Ok(())
    }
}

/// Middleware rejecting requests without an accepted API key.
pub async fn require_api_key(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    ApiKeyGuard::new(&state.api_keys, request.headers()).require()?;

    Ok(next.run(request).await)
}
