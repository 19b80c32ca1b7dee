//! Connection configuration.

use crate::error::{DbError, DbResult};
use tokio_postgres::NoTls;

/// Environment variable holding the connection URL.
pub const DATABASE_URL_ENV: &str = "DATABASE_URL";
/// Environment variable overriding [`DbConfig::max_pool_size`].
pub const POOL_MAX_SIZE_ENV: &str = "PGFILTER_POOL_MAX_SIZE";
/// Environment variable overriding [`DbConfig::recycling`] (`fast`, `verified` or `clean`).
pub const POOL_RECYCLING_ENV: &str = "PGFILTER_POOL_RECYCLING";

const DEFAULT_MAX_POOL_SIZE: usize = 16;

/// How a pooled connection is checked before it is handed out again.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Recycling {
    /// Only check that the connection is not closed.
    #[default]
    Fast,
    /// Run a test query.
    Verified,
    /// Also discard session state (`DISCARD ALL` and friends).
    Clean,
}

impl std::str::FromStr for Recycling {
    type Err = DbError;

    fn from_str(s: &str) -> DbResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fast" => Ok(Self::Fast),
            "verified" => Ok(Self::Verified),
            "clean" => Ok(Self::Clean),
            other => Err(DbError::validation(format!(
                "{POOL_RECYCLING_ENV} must be fast, verified or clean, got {other:?}"
            ))),
        }
    }
}

/// Database connection settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbConfig {
    /// `postgres://` connection URL.
    pub database_url: String,
    /// Maximum number of pooled connections.
    pub max_pool_size: usize,
    /// Check applied when a pooled connection is reused.
    pub recycling: Recycling,
}

impl DbConfig {
    /// Create a configuration with the default pool size.
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            max_pool_size: DEFAULT_MAX_POOL_SIZE,
            recycling: Recycling::default(),
        }
    }

    /// Set the maximum pool size.
    pub fn max_pool_size(mut self, size: usize) -> Self {
        self.max_pool_size = size;
        self
    }

    /// Set how pooled connections are checked on reuse.
    pub fn recycling(mut self, recycling: Recycling) -> Self {
        self.recycling = recycling;
        self
    }

    /// Read `DATABASE_URL` and the optional pool overrides
    /// (`PGFILTER_POOL_MAX_SIZE`, `PGFILTER_POOL_RECYCLING`).
    pub fn from_env() -> DbResult<Self> {
        let url = std::env::var(DATABASE_URL_ENV)
            .map_err(|_| DbError::Connection(format!("{DATABASE_URL_ENV} is not set")))?;
        let size = std::env::var(POOL_MAX_SIZE_ENV).ok();
        let recycling = std::env::var(POOL_RECYCLING_ENV).ok();
        Self::from_parts(url, size.as_deref(), recycling.as_deref())
    }

    fn from_parts(
        url: String,
        max_pool_size: Option<&str>,
        recycling: Option<&str>,
    ) -> DbResult<Self> {
        let mut config = Self::new(url);
        if let Some(raw) = max_pool_size {
            let size: usize = raw.trim().parse().map_err(|_| {
                DbError::validation(format!(
                    "{POOL_MAX_SIZE_ENV} must be a positive integer, got {raw:?}"
                ))
            })?;
            if size == 0 {
                return Err(DbError::validation(format!(
                    "{POOL_MAX_SIZE_ENV} must be at least 1"
                )));
            }
            config.max_pool_size = size;
        }
        if let Some(raw) = recycling {
            config.recycling = raw.parse()?;
        }
        Ok(config)
    }

    /// Parse the URL into a driver configuration.
    pub fn pg_config(&self) -> DbResult<tokio_postgres::Config> {
        self.database_url
            .parse()
            .map_err(|e: tokio_postgres::Error| DbError::Connection(e.to_string()))
    }
}

/// Open a single connection and drive it on a background task.
pub async fn connect(config: &DbConfig) -> DbResult<tokio_postgres::Client> {
    let (client, connection) = config
        .pg_config()?
        .connect(NoTls)
        .await
        .map_err(|e| DbError::Connection(e.to_string()))?;
    tokio::spawn(async move {
        if let Err(e) = connection.await {
            tracing::error!(target: "pgfilter.sql", error = %e, "connection closed with error");
        }
    });
    Ok(client)
}
