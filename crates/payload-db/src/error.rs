//! Error types for the payload store

use std::fmt;

#[derive(Debug)]
pub enum StoreError {
    /// A record already exists for the key; raised by a lost insert race
    KeyConflict { kind: String, version: String },
    Database(Box<sqlx::Error>),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::KeyConflict { kind, version } => {
                write!(f, "Record already exists: {}/{}", kind, version)
            }
            StoreError::Database(err) => write!(f, "Database error: {}", err),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::Database(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::Database(Box::new(err))
    }
}
