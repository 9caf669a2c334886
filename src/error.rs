//! Application error taxonomy.
//!
//! Read paths generally degrade to empty results instead of returning these;
//! write paths surface them so the action aborts before any partial commit.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    /// A write was attempted without an authenticated identity.
    #[error("you must be signed in to do that")]
    Unauthenticated,

    /// A category or thread the request named does not exist.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// A required field was missing or a business rule was violated.
    /// Aborts the action before any write.
    #[error("{0}")]
    Validation(String),

    /// The database or an upstream API reported failure.
    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            Self::Unauthenticated => Redirect::to("/login").into_response(),
            Self::NotFound(what) => {
                (StatusCode::NOT_FOUND, format!("{what} not found")).into_response()
            }
            Self::Validation(message) => {
                (StatusCode::UNPROCESSABLE_ENTITY, message).into_response()
            }
            Self::Backend(e) => {
                tracing::error!("Backend error: {e:#}");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal error").into_response()
            }
        }
    }
}
