//! # noteful-db
//!
//! Storage for folders, tags and notes. [`Database`] bundles the PostgreSQL
//! repositories around one pool; [`MemoryStore`] implements the same traits
//! in process memory.
//!
//! ```rust,ignore
//! let db = Database::connect("postgres://localhost/noteful").await?;
//! db.migrate().await?;
//! let repos = db.repositories();
//! let work = repos.folders.create(&FolderDraft { name: "Work".into() }).await?;
//! ```
pub mod folders;
pub mod memory;
pub mod notes;
pub mod pool;
pub mod tags;

// Schema-isolated databases for integration tests in tests/
#[cfg(feature = "migrations")]
pub mod test_fixtures;

use std::sync::Arc;

use sqlx::{Pool, Postgres};

pub use noteful_core::*;

pub use folders::PgFolderRepository;
pub use memory::MemoryStore;
pub use notes::PgNoteRepository;
pub use pool::{create_pool, create_pool_with_config, log_pool_metrics, PoolConfig};
pub use tags::PgTagRepository;

/// Make `input` match literally inside an `ILIKE` pattern (backslash escapes).
pub fn escape_like(input: &str) -> String {
    input
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// Convert a failed write into a core error, surfacing unique-constraint
/// violations as [`Error::DuplicateKey`].
pub(crate) fn map_write_error(err: sqlx::Error) -> Error {
    if let Some(db_err) = err.as_database_error() {
        if db_err.is_unique_violation() {
            let constraint = db_err.constraint().unwrap_or("unique").to_string();
            return Error::DuplicateKey(constraint);
        }
    }
    Error::Database(err)
}

/// PostgreSQL repositories sharing one pool.
#[derive(Clone)]
pub struct Database {
    pub pool: Pool<Postgres>,
    pub folders: PgFolderRepository,
    pub tags: PgTagRepository,
    pub notes: PgNoteRepository,
}

impl Database {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            folders: PgFolderRepository::new(pool.clone()),
            tags: PgTagRepository::new(pool.clone()),
            notes: PgNoteRepository::new(pool.clone()),
            pool,
        }
    }

    /// Connect with the default [`PoolConfig`].
    pub async fn connect(url: &str) -> Result<Self> {
        let pool = create_pool(url).await?;
        Ok(Self::new(pool))
    }

    pub async fn connect_with_config(url: &str, config: PoolConfig) -> Result<Self> {
        let pool = create_pool_with_config(url, config).await?;
        Ok(Self::new(pool))
    }

    /// Apply the bundled schema migrations that have not run yet.
    #[cfg(feature = "migrations")]
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("../../migrations")
            .run(&self.pool)
            .await
            .map_err(|e| Error::Database(sqlx::Error::Migrate(Box::new(e))))?;
        Ok(())
    }

    pub fn pool(&self) -> &Pool<Postgres> {
        &self.pool
    }

    /// Close every pooled connection. Pending acquisitions fail afterwards.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    /// Repository handles for request handlers.
    pub fn repositories(&self) -> Repositories {
        Repositories::new(
            Arc::new(self.folders.clone()),
            Arc::new(self.tags.clone()),
            Arc::new(self.notes.clone()),
        )
    }
}
