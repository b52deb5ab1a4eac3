use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use sqlx::postgres::{PgConnectOptions, PgSslMode};
use std::fs;
use std::path::Path;
use std::str::FromStr;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AppConfig {
    pub log_level: String,
    pub log_dir: String,
    pub log_file: String,
    pub use_json: bool,
    pub rotation: String,
    pub gateway: GatewayConfig,
    pub auth: AuthConfig,
    /// PostgreSQL connection URL; takes precedence over `db_settings_file`
    #[serde(default)]
    pub postgres_url: Option<String>,
    /// YAML file with host/port/user/password/dbname
    #[serde(default)]
    pub db_settings_file: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GatewayConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AuthConfig {
    /// File holding the raw token signing secret
    pub jwt_secret_file: String,
}

/// Database settings kept in their own file
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct DbSettings {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub dbname: String,
}

impl DbSettings {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read db settings: {}", path.display()))?;
        serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse db settings: {}", path.display()))
    }

    pub fn connect_options(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .password(&self.password)
            .database(&self.dbname)
            .ssl_mode(PgSslMode::Disable)
    }
}

impl AppConfig {
    /// Load `config/<env>.yaml`
    pub fn load(env: &str) -> Result<Self> {
        Self::from_path(format!("config/{}.yaml", env))
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Self = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config yaml: {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.auth.jwt_secret_file.trim().is_empty() {
            bail!("auth.jwt_secret_file must be set");
        }
        if !matches!(self.rotation.as_str(), "hourly" | "daily" | "never") {
            bail!(
                "rotation must be one of hourly, daily, never (got '{}')",
                self.rotation
            );
        }
        Ok(())
    }

    /// Connection options, or `None` when no database is configured
    pub fn database_options(&self) -> Result<Option<PgConnectOptions>> {
        if let Some(url) = &self.postgres_url {
            let options = PgConnectOptions::from_str(url).context("Invalid postgres_url")?;
            return Ok(Some(options));
        }
        match &self.db_settings_file {
            Some(path) => Ok(Some(DbSettings::load(path)?.connect_options())),
            None => Ok(None),
        }
    }
}
