//! Schema bootstrap for users, sessions and admins.
//!
//! Statements are idempotent and run on every startup.

use sqlx::PgPool;

pub const CREATE_USERS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    user_id       BIGSERIAL PRIMARY KEY,
    username      TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL
)
"#;

pub const CREATE_SESSIONS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS sessions (
    user_id BIGINT NOT NULL REFERENCES users (user_id),
    token   TEXT NOT NULL
)
"#;

pub const CREATE_SESSIONS_TOKEN_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS sessions_token_idx ON sessions (token)";

// Rows are managed outside this service; only read here
pub const CREATE_ADMINS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS admins (
    user_id BIGINT PRIMARY KEY REFERENCES users (user_id)
)
"#;

const STATEMENTS: [&str; 4] = [
    CREATE_USERS_TABLE,
    CREATE_SESSIONS_TABLE,
    CREATE_SESSIONS_TOKEN_INDEX,
    CREATE_ADMINS_TABLE,
];

/// Create all tables if missing
pub async fn init_schema(pool: &PgPool) -> Result<(), sqlx::Error> {
    for sql in STATEMENTS {
        sqlx::query(sql).execute(pool).await?;
    }
    tracing::info!("Auth schema ready (users, sessions, admins)");
    Ok(())
}
