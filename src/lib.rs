//! Marketplace account service
//!
//! Username/password registration, login and bearer-token issuance.
//!
//! # Modules
//!
//! - [`user_auth`] - Credentials, password hashing, tokens, stores and the [`AuthService`]
//! - [`gateway`] - axum router, health probe, OpenAPI docs
//! - [`db`] - PostgreSQL pool and schema bootstrap
//! - [`config`] - YAML configuration
//! - [`logging`] - tracing subscriber setup

pub mod config;
pub mod db;
pub mod gateway;
pub mod logging;
pub mod user_auth;

pub use config::AppConfig;
pub use gateway::{build_router, state::AppState};
pub use user_auth::{
    AuthError, AuthService, Credentials, CredentialStore, MemoryCredentialStore,
    PgCredentialStore, SigningSecret, TokenIssuer,
};
