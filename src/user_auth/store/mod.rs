//! Credential persistence gateway.
//!
//! The `users.username` unique constraint is the authority on account
//! uniqueness. Every backend must report a duplicate insert as
//! [`StoreError::AlreadyExists`] instead of overwriting.

pub mod memory;
pub mod postgres;

pub use memory::MemoryCredentialStore;
pub use postgres::PgCredentialStore;

use async_trait::async_trait;
use thiserror::Error;

/// Store failures
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,

    #[error("username already exists")]
    AlreadyExists,

    #[error("database error: {0}")]
    Database(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::RowNotFound => StoreError::NotFound,
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                StoreError::AlreadyExists
            }
            other => StoreError::Database(other.to_string()),
        }
    }
}

#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Backend name for logging
    fn name(&self) -> &'static str;

    async fn find_password_hash(&self, username: &str) -> Result<String, StoreError>;

    /// Insert a user; returns the store-assigned id.
    ///
    /// Fails with `AlreadyExists` if the username is taken.
    async fn create_user(&self, username: &str, password_hash: &str) -> Result<i64, StoreError>;

    async fn save_session(&self, user_id: i64, token: &str) -> Result<(), StoreError>;

    async fn resolve_user_id(&self, username: &str) -> Result<i64, StoreError>;

    /// User owning the session saved under `token`
    async fn find_session_user(&self, token: &str) -> Result<i64, StoreError>;

    async fn is_admin(&self, user_id: i64) -> Result<bool, StoreError>;

    async fn ping(&self) -> Result<(), StoreError>;
}
