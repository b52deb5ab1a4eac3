//! Request-level auth errors.
//!
//! Lower layers (store, hasher, token issuer) are translated into one of these
//! at the service boundary. Response bodies are plain text ending in a newline
//! and never carry internal error detail.

use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Malformed body or missing username/password
    #[error("{0}")]
    BadRequest(String),

    /// Username already registered
    #[error("Username already exists")]
    Conflict,

    /// Unknown user or wrong password, deliberately indistinguishable
    #[error("Invalid username or password")]
    Unauthorized,

    #[error("Missing Authorization header")]
    MissingToken,

    /// Bad signature, expired, or no saved session
    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Admin role required")]
    Forbidden,

    /// Store or crypto failure; the payload is the public message
    #[error("{0}")]
    Internal(&'static str),
}

impl AuthError {
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::BadRequest(_) => "BAD_REQUEST",
            AuthError::Conflict => "CONFLICT",
            AuthError::Unauthorized => "UNAUTHORIZED",
            AuthError::MissingToken => "MISSING_TOKEN",
            AuthError::InvalidToken => "INVALID_TOKEN",
            AuthError::Forbidden => "FORBIDDEN",
            AuthError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    pub fn http_status(&self) -> StatusCode {
        match self {
            // Duplicate usernames are reported as 400, matching the public API
            AuthError::BadRequest(_) | AuthError::Conflict => StatusCode::BAD_REQUEST,
            AuthError::Unauthorized | AuthError::MissingToken | AuthError::InvalidToken => {
                StatusCode::UNAUTHORIZED
            }
            AuthError::Forbidden => StatusCode::FORBIDDEN,
            AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.http_status();
        tracing::debug!(code = self.code(), status = status.as_u16(), "Auth request rejected");
        (
            status,
            [
                (header::CONTENT_TYPE, "text/plain; charset=utf-8"),
                (header::X_CONTENT_TYPE_OPTIONS, "nosniff"),
            ],
            format!("{}\n", self),
        )
            .into_response()
    }
}
