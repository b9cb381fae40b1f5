use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Persisted file payload, keyed by `(kind, version)`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct FileRecord {
    pub kind: String,
    pub version: String,
    pub content: String,
    /// Hex SHA-256 of `content` at the time of the first write
    pub fingerprint: String,
    pub stored_at: DateTime<Utc>,
}

/// Parameters for the first (and only) write of a record
#[derive(Debug, Clone)]
pub struct NewFileRecord {
    pub kind: String,
    pub version: String,
    pub content: String,
    pub fingerprint: String,
    pub stored_at: DateTime<Utc>,
}

impl From<NewFileRecord> for FileRecord {
    fn from(p: NewFileRecord) -> Self {
        Self {
            kind: p.kind,
            version: p.version,
            content: p.content,
            fingerprint: p.fingerprint,
            stored_at: p.stored_at,
        }
    }
}
