//! Server configuration read from the environment.
//!
//! | Variable | Default |
//! |----------|---------|
//! | `DATABASE_URL` | `postgres://localhost/noteful` |
//! | `HOST` | `0.0.0.0` |
//! | `PORT` | `8080` |
//! | `DB_MAX_CONNECTIONS` | `10` |
//! | `RUN_MIGRATIONS` | `true` |
//! | `STORAGE_BACKEND` | `postgres` (or `memory`) |
//! | `ALLOWED_ORIGINS` | `http://localhost:3000` |
//! | `MAX_BODY_BYTES` | `1048576` |
//! | `LOG_FORMAT` | `text` (or `json`) |
//! | `LOG_FILE` | unset (stdout only) |
//! | `LOG_ANSI` | auto |

use std::path::PathBuf;
use std::str::FromStr;

use noteful_core::{Error, Result};

pub const DEFAULT_DATABASE_URL: &str = "postgres://localhost/noteful";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Postgres,
    /// Process-local store, lost on exit.
    Memory,
}

impl FromStr for StorageBackend {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(StorageBackend::Postgres),
            "memory" => Ok(StorageBackend::Memory),
            other => Err(Error::Config(format!(
                "STORAGE_BACKEND must be `postgres` or `memory`, got `{}`",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    pub format: LogFormat,
    pub file: Option<PathBuf>,
    /// `None` leaves colour detection to the subscriber.
    pub ansi: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpConfig {
    pub allowed_origins: Vec<String>,
    pub max_body_bytes: usize,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec!["http://localhost:3000".to_string()],
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub max_connections: u32,
    pub run_migrations: bool,
    pub storage: StorageBackend,
    pub http: HttpConfig,
    pub log: LogConfig,
}

impl ServerConfig {
    /// Read the configuration from process environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read the configuration through `lookup`, which returns the value of a
    /// variable or `None` when it is unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let allowed_origins = match var("ALLOWED_ORIGINS") {
            Some(raw) => parse_origins(&raw),
            None => HttpConfig::default().allowed_origins,
        };

        Ok(Self {
            database_url: var("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            host: var("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse_var("PORT", var("PORT"), DEFAULT_PORT)?,
            max_connections: parse_var("DB_MAX_CONNECTIONS", var("DB_MAX_CONNECTIONS"), 10)?,
            run_migrations: parse_flag("RUN_MIGRATIONS", var("RUN_MIGRATIONS"))?.unwrap_or(true),
            storage: var("STORAGE_BACKEND")
                .map(|v| v.parse::<StorageBackend>())
                .transpose()?
                .unwrap_or(StorageBackend::Postgres),
            http: HttpConfig {
                allowed_origins,
                max_body_bytes: parse_var(
                    "MAX_BODY_BYTES",
                    var("MAX_BODY_BYTES"),
                    DEFAULT_MAX_BODY_BYTES,
                )?,
            },
            log: LogConfig {
                format: match var("LOG_FORMAT").as_deref() {
                    Some("json") => LogFormat::Json,
                    _ => LogFormat::Text,
                },
                file: var("LOG_FILE").map(PathBuf::from),
                ansi: parse_flag("LOG_ANSI", var("LOG_ANSI"))?,
            },
        })
    }

    /// `host:port` string the listener binds to.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_var<T: FromStr>(key: &str, value: Option<String>, default: T) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    match value {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| Error::Config(format!("{} has invalid value `{}`: {}", key, raw, e))),
    }
}

fn parse_flag(key: &str, value: Option<String>) -> Result<Option<bool>> {
    match value.as_deref().map(str::trim) {
        None => Ok(None),
        Some("true") | Some("1") => Ok(Some(true)),
        Some("false") | Some("0") => Ok(Some(false)),
        Some(other) => Err(Error::Config(format!(
            "{} must be true or false, got `{}`",
            key, other
        ))),
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
