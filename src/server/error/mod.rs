//! Error types and HTTP response handling.
//!
//! This module provides the application's error hierarchy and conversion logic for
//! transforming errors into appropriate HTTP responses. The `AppError` enum serves
//! as the top-level error type that wraps domain-specific errors and implements
//! `IntoResponse` for automatic error handling in API endpoints.
//!
//! Per-operation failures of the reconciliation engine are modelled separately as
//! [`fault::Fault`] values; they carry their own code and status and pass through
//! `AppError` unchanged when they reach the API boundary.

pub mod command;
pub mod config;
pub mod fault;
pub mod internal;
pub mod taxonomy;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::server::{
    error::{
        command::CommandBuildError, config::ConfigError, fault::Fault, internal::InternalError,
        taxonomy::TaxonomyError,
    },
    model::api::FaultDto,
};

/// Top-level application error type.
///
/// Aggregates all possible error types that can occur in the application and provides
/// automatic conversion to HTTP responses. Most variants use `#[from]` for automatic
/// error conversion. Faults handle their own status mapping, while generic variants
/// provide standard HTTP status codes.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration error during startup or environment variable loading.
    ///
    /// Always results in 500 Internal Server Error as configuration issues
    /// prevent normal application operation.
    #[error(transparent)]
    ConfigErr(#[from] ConfigError),

    /// Database operation error from SeaORM.
    ///
    /// Results in 500 Internal Server Error with error details logged server-side.
    #[error(transparent)]
    DbErr(#[from] sea_orm::DbErr),

    /// Internal codebase error such as a stored id that fails to parse.
    #[error(transparent)]
    InternalErr(#[from] InternalError),

    /// Expected per-operation failure from the reconciliation engine.
    ///
    /// Responds with the fault's own status code and JSON body.
    #[error(transparent)]
    Fault(#[from] Fault),

    /// Invalid command tree declared at startup.
    #[error(transparent)]
    CommandBuildErr(#[from] CommandBuildError),

    /// Key roles missing from a community.
    #[error(transparent)]
    TaxonomyErr(#[from] TaxonomyError),

    /// Discord API error from Serenity.
    ///
    /// Boxed due to large size. Results in 500 Internal Server Error when
    /// Discord bot operations fail.
    #[error(transparent)]
    DiscordErr(#[from] Box<serenity::Error>),

    /// I/O error while binding or serving the HTTP listener.
    #[error(transparent)]
    IoErr(#[from] std::io::Error),

    /// Resource not found error.
    ///
    /// Results in 404 Not Found with the provided error message.
    #[error("{0}")]
    NotFound(String),

    /// Invalid request error.
    ///
    /// Results in 400 Bad Request with the provided error message.
    #[error("{0}")]
    BadRequest(String),

    /// Missing or invalid API key.
    ///
    /// Results in 401 Unauthorized with the provided error message.
    #[error("{0}")]
    Unauthorized(String),

    /// Internal server error with custom message.
    ///
    /// Results in 500 Internal Server Error. The provided message is logged
    /// but a generic message is returned to the client.
    #[error("{0}")]
    InternalError(String),
}

/// Manual conversion from serenity::Error to AppError.
///
/// Boxes the error to reduce the size of the AppError enum, as serenity::Error
/// is very large and would make all AppError variants larger if not boxed.
impl From<serenity::Error> for AppError {
    fn from(err: serenity::Error) -> Self {
        AppError::DiscordErr(Box::new(err))
    }
}

/// Converts application errors into HTTP responses.
///
/// # Returns
/// - Fault status - For `Fault`, using the fault's own code and status
/// - 400 Bad Request - For `BadRequest` variant and taxonomy errors
/// - 401 Unauthorized - For `Unauthorized` variant
/// - 404 Not Found - For `NotFound` variant
/// - 500 Internal Server Error - For all other error types
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            Self::Fault(fault) => {
                (fault.http_status(), Json(FaultDto::from(&fault))).into_response()
            }
            Self::NotFound(msg) => (
                StatusCode::NOT_FOUND,
                Json(FaultDto::new("NOT_FOUND", msg)),
            )
                .into_response(),
            Self::BadRequest(msg) => (
                StatusCode::BAD_REQUEST,
                Json(FaultDto::new("BAD_REQUEST", msg)),
            )
                .into_response(),
            Self::TaxonomyErr(err) => (
                StatusCode::BAD_REQUEST,
                Json(FaultDto::from(&Fault::unidentified(err))),
            )
                .into_response(),
            Self::Unauthorized(msg) => (
                StatusCode::UNAUTHORIZED,
                Json(FaultDto::from(&Fault::Unidentified(msg))),
            )
                .into_response(),
            Self::InternalError(msg) => InternalServerError(msg).into_response(),
            err => InternalServerError(err).into_response(),
        }
    }
}

/// Wrapper type for converting any displayable error into a 500 Internal Server Error response.
///
/// This struct logs the error message and returns a generic unidentified fault to the
/// client to avoid leaking implementation details.
pub struct InternalServerError<E>(pub E);

impl<E: std::fmt::Display> IntoResponse for InternalServerError<E> {
    fn into_response(self) -> Response {
        tracing::error!("{}", self.0);

        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(FaultDto::from(&Fault::unidentified(""))),
        )
            .into_response()
    }
}
