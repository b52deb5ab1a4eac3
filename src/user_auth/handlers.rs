use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};
use std::sync::Arc;

use super::error::AuthError;
use super::models::Credentials;
use crate::gateway::state::AppState;

fn bad_body(rejection: JsonRejection) -> AuthError {
    tracing::debug!("Rejected request body: {}", rejection);
    AuthError::BadRequest(rejection.body_text())
}

/// Register a new user
///
/// POST /api/v1/register
#[utoipa::path(
    post,
    path = "/api/v1/register",
    request_body = Credentials,
    responses(
        (status = 201, description = "User registered", body = String, content_type = "text/plain"),
        (status = 400, description = "Invalid input or username already exists", body = String,
            content_type = "text/plain"),
        (status = 500, description = "Internal server error", body = String, content_type = "text/plain")
    ),
    tag = "Auth"
)]
pub async fn register(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<Credentials>, JsonRejection>,
) -> Result<(StatusCode, &'static str), AuthError> {
    let Json(creds) = payload.map_err(bad_body)?;

    state.auth.register(creds).await?;
    Ok((StatusCode::CREATED, "User was registered"))
}

/// Login user and issue a bearer token
///
/// POST /api/v1/login
#[utoipa::path(
    post,
    path = "/api/v1/login",
    request_body = Credentials,
    responses(
        (status = 200, description = "Login successful", body = String, content_type = "text/plain"),
        (status = 400, description = "Invalid input", body = String, content_type = "text/plain"),
        (status = 401, description = "Invalid username or password", body = String,
            content_type = "text/plain"),
        (status = 500, description = "Internal server error", body = String, content_type = "text/plain")
    ),
    tag = "Auth"
)]
pub async fn login(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<Credentials>, JsonRejection>,
) -> Result<(StatusCode, String), AuthError> {
    let Json(creds) = payload.map_err(bad_body)?;

    let token = state.auth.login(creds).await?;
    Ok((
        StatusCode::OK,
        format!("User was logged in with token: {}", token),
    ))
}
