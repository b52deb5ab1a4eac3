//! PostgreSQL credential store

use async_trait::async_trait;
use sqlx::PgPool;

use super::{CredentialStore, StoreError};

pub struct PgCredentialStore {
    pool: PgPool,
}

impl PgCredentialStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CredentialStore for PgCredentialStore {
    fn name(&self) -> &'static str {
        "postgres"
    }

    async fn find_password_hash(&self, username: &str) -> Result<String, StoreError> {
        let hash: Option<String> =
            sqlx::query_scalar(r#"SELECT password_hash FROM users WHERE username = $1"#)
                .bind(username)
                .fetch_optional(&self.pool)
                .await?;

        hash.ok_or(StoreError::NotFound)
    }

    async fn create_user(&self, username: &str, password_hash: &str) -> Result<i64, StoreError> {
        // A unique_violation on users.username surfaces as AlreadyExists
        let user_id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO users (username, password_hash)
            VALUES ($1, $2)
            RETURNING user_id
            "#,
        )
        .bind(username)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await?;

        Ok(user_id)
    }

    async fn save_session(&self, user_id: i64, token: &str) -> Result<(), StoreError> {
        sqlx::query(r#"INSERT INTO sessions (user_id, token) VALUES ($1, $2)"#)
            .bind(user_id)
            .bind(token)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn resolve_user_id(&self, username: &str) -> Result<i64, StoreError> {
        let user_id: Option<i64> =
            sqlx::query_scalar(r#"SELECT user_id FROM users WHERE username = $1"#)
                .bind(username)
                .fetch_optional(&self.pool)
                .await?;

        user_id.ok_or(StoreError::NotFound)
    }

    async fn find_session_user(&self, token: &str) -> Result<i64, StoreError> {
        let user_id: Option<i64> =
            sqlx::query_scalar(r#"SELECT user_id FROM sessions WHERE token = $1 LIMIT 1"#)
                .bind(token)
                .fetch_optional(&self.pool)
                .await?;

        user_id.ok_or(StoreError::NotFound)
    }

    async fn is_admin(&self, user_id: i64) -> Result<bool, StoreError> {
        let exists: bool =
            sqlx::query_scalar(r#"SELECT EXISTS (SELECT 1 FROM admins WHERE user_id = $1)"#)
                .bind(user_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
