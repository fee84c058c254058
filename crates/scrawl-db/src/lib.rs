//! # scrawl-db
//!
//! Storage layer for scrawl.
//!
//! This crate provides:
//! - Connection pool management
//! - The PostgreSQL note store (one row per note)
//! - The in-memory fallback store for environments without a database
//!
//! ## Example
//!
//! ```rust,ignore
//! use scrawl_db::{Storage, StorageBackend};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let backend = StorageBackend::Postgres {
//!         url: "postgres://localhost/scrawl".to_string(),
//!     };
//!     let storage = Storage::connect(&backend).await?;
//!     let notes = storage.notes.list_for_user("u1").await?;
//!     println!("{} notes", notes.len());
//!     Ok(())
//! }
//! ```

pub mod memory;
pub mod notes;
pub mod pool;

// Re-export core types
pub use scrawl_core::*;

// Re-export store implementations
pub use memory::MemoryNoteStore;
pub use notes::PgNoteStore;
pub use pool::{create_pool, create_pool_with_config, PoolConfig};

use std::sync::Arc;

use tracing::info;

/// Storage backend, selected once at startup from configuration.
///
/// The backend is an explicit choice, never inferred from a connection
/// being absent at request time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackend {
    /// Durable PostgreSQL store.
    Postgres { url: String },
    /// Process-lifetime in-memory fallback. No persistence across restarts.
    Memory,
}

/// Connected storage context.
pub struct Storage {
    /// The selected note store.
    pub notes: Arc<dyn NoteStore>,
    /// Underlying connection pool when the Postgres backend is active.
    pool: Option<sqlx::Pool<sqlx::Postgres>>,
}

impl Storage {
    /// Connect the configured backend.
    pub async fn connect(backend: &StorageBackend) -> Result<Self> {
        match backend {
            StorageBackend::Postgres { url } => {
                let pool = pool::create_pool(url).await?;
                Ok(Self {
                    notes: Arc::new(PgNoteStore::new(pool.clone())),
                    pool: Some(pool),
                })
            }
            StorageBackend::Memory => {
                info!(
                    subsystem = "database",
                    component = "memory",
                    "Using in-memory note store"
                );
                Ok(Self {
                    notes: Arc::new(MemoryNoteStore::new()),
                    pool: None,
                })
            }
        }
    }

    /// Get the underlying connection pool, if any.
    pub fn pool(&self) -> Option<&sqlx::Pool<sqlx::Postgres>> {
        self.pool.as_ref()
    }

    /// Run pending migrations. No-op for the in-memory backend.
    #[cfg(feature = "migrations")]
    pub async fn migrate(&self) -> Result<()> {
        if let Some(pool) = &self.pool {
            sqlx::migrate!("../../migrations")
                .run(pool)
                .await
                .map_err(|e| Error::Database(sqlx::Error::Migrate(Box::new(e))))?;
        }
        Ok(())
    }
}
