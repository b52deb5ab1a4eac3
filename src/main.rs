//! market_auth - account registration and login gateway
//!
//! ```text
//! ┌──────────┐    ┌─────────────┐    ┌─────────────────┐
//! │  Client  │───▶│   Gateway   │───▶│   AuthService   │
//! │  (HTTP)  │    │   (axum)    │    │ hash/token/lock │
//! └──────────┘    └─────────────┘    └────────┬────────┘
//!                                             ▼
//!                                    ┌─────────────────┐
//!                                    │ CredentialStore │
//!                                    │ (Postgres/mem)  │
//!                                    └─────────────────┘
//! ```

use std::sync::Arc;

use anyhow::{Context, Result};

use market_auth::config::AppConfig;
use market_auth::db::{Database, schema};
use market_auth::gateway::{self, state::AppState};
use market_auth::logging;
use market_auth::user_auth::{
    Argon2PasswordHasher, AuthService, CredentialStore, MemoryCredentialStore, PgCredentialStore,
    SigningSecret, TokenIssuer,
};

fn get_env() -> String {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if (args[i] == "--env" || args[i] == "-e") && i + 1 < args.len() {
            return args[i + 1].clone();
        }
    }
    "dev".to_string()
}

fn get_port_override() -> Option<u16> {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if args[i] == "--port" && i + 1 < args.len() {
            return args[i + 1].parse().ok();
        }
    }
    None
}

async fn open_store(config: &AppConfig) -> Result<Arc<dyn CredentialStore>> {
    match config.database_options()? {
        Some(options) => {
            let db = Database::connect_with(options)
                .await
                .context("Failed to connect to PostgreSQL")?;
            schema::init_schema(db.pool())
                .await
                .context("Failed to initialize schema")?;
            Ok(Arc::new(PgCredentialStore::new(db.pool().clone())))
        }
        None => {
            tracing::warn!(
                "No database configured (postgres_url / db_settings_file); \
                 using in-memory credential store, accounts will not survive restart"
            );
            Ok(Arc::new(MemoryCredentialStore::new()))
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let env = get_env();
    let config = AppConfig::load(&env)?;
    let _log_guard = logging::init_logging(&config);

    tracing::info!("Starting market_auth in {} mode", env);

    let secret = SigningSecret::load(&config.auth.jwt_secret_file).with_context(|| {
        format!(
            "Failed to load signing secret from {}",
            config.auth.jwt_secret_file
        )
    })?;

    let store = open_store(&config).await?;
    tracing::info!("Credential store: {}", store.name());

    let auth = AuthService::new(
        store,
        Arc::new(Argon2PasswordHasher::new()),
        TokenIssuer::new(secret),
    );
    let state = Arc::new(AppState::new(Arc::new(auth)));

    let port = get_port_override().unwrap_or(config.gateway.port);
    gateway::run_server(&config.gateway.host, port, state).await
}
