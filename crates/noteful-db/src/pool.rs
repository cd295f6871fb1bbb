//! PostgreSQL connection pool.

use std::time::{Duration, Instant};

use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::{debug, info, warn};

use noteful_core::{Error, Result};

pub const DEFAULT_MAX_CONNECTIONS: u32 = 10;

/// How a pool is sized and which schema its connections use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolConfig {
    pub max_connections: u32,
    pub min_connections: u32,
    /// Longest wait for a free connection before a query fails.
    pub acquire_timeout: Duration,
    pub idle_timeout: Option<Duration>,
    /// Schema set as `search_path` on every new connection.
    pub schema: Option<String>,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_connections: DEFAULT_MAX_CONNECTIONS,
            min_connections: 0,
            acquire_timeout: Duration::from_secs(10),
            idle_timeout: Some(Duration::from_secs(600)),
            schema: None,
        }
    }
}

impl PoolConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn max_connections(mut self, n: u32) -> Self {
        self.max_connections = n;
        self
    }

    pub fn min_connections(mut self, n: u32) -> Self {
        self.min_connections = n;
        self
    }

    pub fn acquire_timeout(mut self, timeout: Duration) -> Self {
        self.acquire_timeout = timeout;
        self
    }

    pub fn idle_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.idle_timeout = timeout;
        self
    }

    /// Pin every connection to `schema`. The name must be a plain identifier.
    pub fn schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    fn validate(&self) -> Result<()> {
        if self.max_connections == 0 {
            return Err(Error::Config("max_connections must be at least 1".into()));
        }
        if self.min_connections > self.max_connections {
            return Err(Error::Config(format!(
                "min_connections ({}) exceeds max_connections ({})",
                self.min_connections, self.max_connections
            )));
        }
        if let Some(schema) = &self.schema {
            if !is_plain_identifier(schema) {
                return Err(Error::Config(format!("invalid schema name `{}`", schema)));
            }
        }
        Ok(())
    }
}

/// ASCII letters, digits and underscores, not starting with a digit.
fn is_plain_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Open a pool with the default configuration.
pub async fn create_pool(database_url: &str) -> Result<PgPool> {
    create_pool_with_config(database_url, PoolConfig::default()).await
}

/// Open a pool. Fails fast if the first connection cannot be established.
pub async fn create_pool_with_config(database_url: &str, config: PoolConfig) -> Result<PgPool> {
    config.validate()?;
    let start = Instant::now();

    let mut options = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(config.acquire_timeout)
        .idle_timeout(config.idle_timeout);

    if let Some(schema) = config.schema.clone() {
        options = options.after_connect(move |conn, _meta| {
            let statement = format!("SET search_path TO {}", schema);
            Box::pin(async move {
                sqlx::query(&statement).execute(&mut *conn).await?;
                Ok(())
            })
        });
    }

    let pool = options
        .connect(database_url)
        .await
        .map_err(Error::Database)?;

    info!(
        subsystem = "db",
        component = "pool",
        op = "connect",
        max_connections = config.max_connections,
        schema = config.schema.as_deref().unwrap_or("public"),
        duration_ms = start.elapsed().as_millis() as u64,
        "Database pool ready"
    );
    Ok(pool)
}

/// Log pool occupancy, warning when every connection is checked out.
pub fn log_pool_metrics(pool: &PgPool) {
    let size = pool.size();
    let idle = pool.num_idle();

    debug!(
        subsystem = "db",
        component = "pool",
        pool_size = size,
        pool_idle = idle,
        "Pool occupancy"
    );

    if size > 0 && idle == 0 {
        warn!(
            subsystem = "db",
            component = "pool",
            pool_size = size,
            "No idle connections"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = PoolConfig::default();
        assert_eq!(config.max_connections, DEFAULT_MAX_CONNECTIONS);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let config = PoolConfig::new()
            .max_connections(4)
            .min_connections(1)
            .acquire_timeout(Duration::from_secs(2))
            .idle_timeout(None)
            .schema("test_abc");
        assert_eq!(config.max_connections, 4);
        assert_eq!(config.min_connections, 1);
        assert_eq!(config.acquire_timeout, Duration::from_secs(2));
        assert_eq!(config.idle_timeout, None);
        assert_eq!(config.schema.as_deref(), Some("test_abc"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_bad_sizes() {
        assert!(matches!(
            PoolConfig::new().max_connections(0).validate(),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            PoolConfig::new().max_connections(2).min_connections(3).validate(),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_schema_must_be_plain_identifier() {
        for bad in ["", "1abc", "a-b", "public; DROP TABLE note", "x y"] {
            assert!(
                PoolConfig::new().schema(bad).validate().is_err(),
                "{:?}",
                bad
            );
        }
        for good in ["public", "_tmp", "test_0190a5a4"] {
            assert!(PoolConfig::new().schema(good).validate().is_ok());
        }
    }
}
