//! Database connection and management module
//!
//! This module provides database configuration, connection pooling, and the
//! establishment stores built on top of the pool.

use std::time::Duration;

use sqlx::{postgres::PgPoolOptions, PgPool};
use tracing::{info, warn};
use url::Url;

use crate::config::{lookup_var, parse_var, ConfigError, Lookup};

pub mod establishment_repository;
pub mod memory_store;
pub mod store;

// Re-export repository and trait for convenience
pub use establishment_repository::{PgEstablishmentStore, TABLE};
pub use memory_store::MemoryEstablishmentStore;
pub use store::EstablishmentStore;

pub const DEFAULT_DATABASE_URL: &str = "postgresql://localhost:5432/siret";

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub connection_timeout: Duration,
    pub idle_timeout: Option<Duration>,
    pub max_lifetime: Option<Duration>,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            max_connections: 10,
            connection_timeout: Duration::from_secs(30),
            idle_timeout: Some(Duration::from_secs(600)), // 10 minutes
            max_lifetime: Some(Duration::from_secs(1800)), // 30 minutes
        }
    }
}

impl DatabaseConfig {
    /// `DATABASE_URL` wins; otherwise the URL is assembled from the discrete
    /// `DB_HOST`/`DB_PORT`/`DB_USER`/`DB_PASSWORD`/`DB_NAME` variables when any
    /// of them is set.
    pub fn from_lookup(lookup: Lookup<'_>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let database_url = match lookup_var(lookup, "DATABASE_URL") {
            Some(url) => url,
            None => url_from_parts(lookup)?.unwrap_or(defaults.database_url),
        };

        let timeout_secs = parse_var(
            lookup,
            "DATABASE_ACQUIRE_TIMEOUT_SECS",
            defaults.connection_timeout.as_secs(),
        )?;

        Ok(Self {
            database_url,
            max_connections: parse_var(lookup, "DATABASE_POOL_SIZE", defaults.max_connections)?,
            connection_timeout: Duration::from_secs(timeout_secs),
            ..defaults
        })
    }
}

fn url_from_parts(lookup: Lookup<'_>) -> Result<Option<String>, ConfigError> {
    const PARTS: [&str; 5] = ["DB_HOST", "DB_PORT", "DB_USER", "DB_PASSWORD", "DB_NAME"];
    if PARTS.iter().all(|var| lookup_var(lookup, var).is_none()) {
        return Ok(None);
    }

    let host = lookup_var(lookup, "DB_HOST").unwrap_or_else(|| "localhost".to_string());
    let invalid = |var: &'static str, value: &str, reason: &str| ConfigError::Invalid {
        var,
        value: value.to_string(),
        reason: reason.to_string(),
    };

    let mut url = Url::parse(&format!("postgresql://{host}"))
        .map_err(|e| invalid("DB_HOST", &host, &e.to_string()))?;

    let port: u16 = parse_var(lookup, "DB_PORT", 5432)?;
    url.set_port(Some(port))
        .map_err(|_| invalid("DB_PORT", &port.to_string(), "cannot set port"))?;

    if let Some(user) = lookup_var(lookup, "DB_USER") {
        url.set_username(&user)
            .map_err(|_| invalid("DB_USER", &user, "cannot set username"))?;
    }
    if let Some(password) = lookup_var(lookup, "DB_PASSWORD") {
        url.set_password(Some(&password))
            .map_err(|_| invalid("DB_PASSWORD", "***", "cannot set password"))?;
    }
    if let Some(name) = lookup_var(lookup, "DB_NAME") {
        url.set_path(&name);
    }

    Ok(Some(url.to_string()))
}

/// Owns the Postgres pool for the lifetime of the server.
pub struct DatabaseManager {
    pool: PgPool,
}

impl DatabaseManager {
    /// Open the pool. At least one connection is established before this
    /// returns, so an unreachable database fails here.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, sqlx::Error> {
        info!(
            url = %mask_database_url(&config.database_url),
            max_connections = config.max_connections,
            "Connecting to establishment database"
        );

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.connection_timeout)
            .idle_timeout(config.idle_timeout)
            .max_lifetime(config.max_lifetime)
            .connect(&config.database_url)
            .await
            .inspect_err(|e| warn!("Database connection failed: {}", e))?;

        info!(
            size = pool.size(),
            idle = pool.num_idle(),
            "Establishment database pool ready"
        );
        Ok(Self { pool })
    }

    pub fn establishment_store(&self) -> PgEstablishmentStore {
        PgEstablishmentStore::new(self.pool.clone())
    }

    pub async fn close(self) {
        info!("Closing establishment database pool");
        self.pool.close().await;
    }
}

/// Mask sensitive information in database URL for logging
pub fn mask_database_url(url: &str) -> String {
    match Url::parse(url) {
        Ok(parsed) => {
            let mut masked = parsed.clone();
            if parsed.password().is_some() {
                let _ = masked.set_password(Some("***"));
            }
            masked.to_string()
        }
        Err(_) => "<unparseable database url>".to_string(),
    }
}
