//! Bearer-token middlewares for routers mounted behind this service.

use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, Request, header},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use super::error::AuthError;
use crate::gateway::state::AppState;

/// Extract the token from `Authorization: Bearer <token>`
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or(AuthError::MissingToken)?;

    auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(AuthError::InvalidToken)
}

/// Accepts any validly signed, unexpired token and injects its `Claims`.
pub async fn jwt_auth_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AuthError> {
    let claims = state.auth.verify_token(bearer_token(request.headers())?)?;

    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}

/// Requires a token from a saved login session whose user owns the admin
/// role. Injects `AuthenticatedUser`.
pub async fn admin_auth_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AuthError> {
    let token = bearer_token(request.headers())?.to_string();
    let user = state.auth.authorize_admin(&token).await?;

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}
