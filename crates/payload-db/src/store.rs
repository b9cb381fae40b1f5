//! Store abstraction over the `file_data` table
//!
//! Records are write-once: the store offers lookup and insert-if-absent only.
//! Conflicting inserts surface as [`StoreError::KeyConflict`] so callers can
//! distinguish a lost race from a real failure.

use crate::error::StoreError;
use crate::file_data;
use crate::types::{FileRecord, NewFileRecord};
use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::{debug, info};

#[async_trait]
pub trait FileStore: Send + Sync {
    /// Fetch the record for `(kind, version)`, `None` if no row exists
    async fn find_by_key(&self, kind: &str, version: &str)
        -> Result<Option<FileRecord>, StoreError>;

    /// Insert `record` unless its key is taken, in which case
    /// [`StoreError::KeyConflict`] is returned and nothing is written
    async fn insert_if_absent(&self, record: &NewFileRecord) -> Result<(), StoreError>;
}

/// PostgreSQL-backed store
#[derive(Clone)]
pub struct PgFileStore {
    pool: PgPool,
}

impl PgFileStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect to the database
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, StoreError> {
        info!("Connecting to database...");
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        info!("Database connection established");
        Ok(Self { pool })
    }

    /// Create the `file_data` table if it does not exist
    pub async fn migrate(&self) -> Result<(), StoreError> {
        crate::migrate::migrate(&self.pool).await?;
        Ok(())
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl FileStore for PgFileStore {
    async fn find_by_key(
        &self,
        kind: &str,
        version: &str,
    ) -> Result<Option<FileRecord>, StoreError> {
        Ok(file_data::find_by_key(&self.pool, kind, version).await?)
    }

    async fn insert_if_absent(&self, record: &NewFileRecord) -> Result<(), StoreError> {
        match file_data::insert(&self.pool, record).await {
            Ok(()) => Ok(()),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                debug!(
                    kind = %record.kind,
                    version = %record.version,
                    "Insert rejected by primary key"
                );
                Err(StoreError::KeyConflict {
                    kind: record.kind.clone(),
                    version: record.version.clone(),
                })
            }
            Err(e) => Err(e.into()),
        }
    }
}
