//! In-process store with the same write-once semantics as [`PgFileStore`]
//!
//! [`PgFileStore`]: crate::store::PgFileStore

use crate::error::StoreError;
use crate::store::FileStore;
use crate::types::{FileRecord, NewFileRecord};
use async_trait::async_trait;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use tokio::sync::RwLock;

#[derive(Debug, Default)]
pub struct MemoryFileStore {
    records: RwLock<HashMap<(String, String), FileRecord>>,
}

impl MemoryFileStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the record for `(kind, version)`
    pub async fn get(&self, kind: &str, version: &str) -> Option<FileRecord> {
        self.records
            .read()
            .await
            .get(&(kind.to_string(), version.to_string()))
            .cloned()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl FileStore for MemoryFileStore {
    async fn find_by_key(
        &self,
        kind: &str,
        version: &str,
    ) -> Result<Option<FileRecord>, StoreError> {
        Ok(self.get(kind, version).await)
    }

    async fn insert_if_absent(&self, record: &NewFileRecord) -> Result<(), StoreError> {
        let mut records = self.records.write().await;
        match records.entry((record.kind.clone(), record.version.clone())) {
            Entry::Occupied(_) => Err(StoreError::KeyConflict {
                kind: record.kind.clone(),
                version: record.version.clone(),
            }),
            Entry::Vacant(slot) => {
                slot.insert(record.clone().into());
                Ok(())
            }
        }
    }
}
