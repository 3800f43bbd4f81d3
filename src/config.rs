//! Application configuration

use std::env;
use std::path::Path;
use std::time::Duration;

use config::{Config, ConfigBuilder, ConfigError, Environment, File};
use serde::Deserialize;
use serde_with::serde_as;

use crate::errors::ShipmanError;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub http: HttpConfig,
    pub database: DatabaseConfig,
}

#[serde_as]
#[derive(Debug, Deserialize, Clone)]
pub struct HttpConfig {
    pub address: String,
    /// Deadline applied to every repository call made on behalf of a request
    #[serde_as(as = "serde_with::DurationSeconds<u64>")]
    pub request_timeout: Duration,
}

#[serde_as]
#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// Full connection string. When absent, one is composed from the `PG*` variables.
    pub url: Option<String>,
    pub max_connections: u32,
    pub min_connections: u32,
    #[serde_as(as = "serde_with::DurationSeconds<u64>")]
    pub max_lifetime: Duration,
    #[serde_as(as = "serde_with::DurationSeconds<u64>")]
    pub acquire_timeout: Duration,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        Self::build(
            File::with_name("config/default").required(false),
            |key| env::var(key).ok(),
        )
    }

    /// Load from an explicit file, still honouring environment overrides
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        Self::build(File::from(path), |key| env::var(key).ok())
    }

    /// `DATABASE_URL` and `HTTP_ADDR` take precedence over every other source
    fn build<S>(file: S, lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError>
    where
        S: config::Source + Send + Sync + 'static,
    {
        Self::builder()?
            .add_source(file)
            .add_source(Self::environment())
            .set_override_option("database.url", lookup("DATABASE_URL"))?
            .set_override_option("http.address", lookup("HTTP_ADDR"))?
            .build()?
            .try_deserialize()
    }

    fn builder() -> Result<ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        Config::builder()
            .set_default("http.address", "0.0.0.0:8080")?
            .set_default("http.request_timeout", 30)?
            .set_default("database.max_connections", 15)?
            .set_default("database.min_connections", 5)?
            .set_default("database.max_lifetime", 2 * 60 * 60)?
            .set_default("database.acquire_timeout", 5)
    }

    fn environment() -> Environment {
        Environment::with_prefix("SHIPMAN")
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true)
    }
}

impl DatabaseConfig {
    /// Validate configuration parameters
    pub fn validate(&self) -> Result<(), ShipmanError> {
        if self.max_connections == 0 {
            return Err(ShipmanError::ConfigurationError {
                message: "max_connections must be greater than zero".to_string(),
            });
        }
        if self.min_connections > self.max_connections {
            return Err(ShipmanError::ConfigurationError {
                message: format!(
                    "min_connections ({}) exceeds max_connections ({})",
                    self.min_connections, self.max_connections
                ),
            });
        }
        if self.acquire_timeout.is_zero() {
            return Err(ShipmanError::ConfigurationError {
                message: "acquire_timeout must be greater than zero".to_string(),
            });
        }
        Ok(())
    }

    /// Connection string, either configured or built from libpq-style variables
    pub fn connection_url(&self) -> String {
        match &self.url {
            Some(url) if !url.is_empty() => url.clone(),
            _ => compose_url(|key| env::var(key).ok()),
        }
    }
}

fn compose_url(lookup: impl Fn(&str) -> Option<String>) -> String {
    let var = |key: &str, fallback: &str| {
        lookup(key)
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| fallback.to_string())
    };
    let host = var("PGHOST", "localhost");
    let port = var("PGPORT", "5432");
    let user = var("PGUSER", "postgres");
    let name = var("PGDATABASE", "shipman");
    let sslmode = var("PGSSLMODE", "disable");

    match lookup("PGPASSWORD").filter(|p| !p.is_empty()) {
        Some(password) => format!(
            "postgres://{}:{}@{}:{}/{}?sslmode={}",
            user, password, host, port, name, sslmode
        ),
        None => format!(
            "postgres://{}@{}:{}/{}?sslmode={}",
            user, host, port, name, sslmode
        ),
    }
}
