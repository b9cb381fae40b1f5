//! Blob resolution by `(type, version)`

use crate::error::{BlobSourceError, Result};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::PathBuf;
use tokio::fs;
use tracing::debug;

/// Read-only key-value capability yielding the raw bytes of a logical file
#[async_trait]
pub trait BlobSource: Send + Sync {
    /// Fetch the blob stored under `(kind, version)`.
    ///
    /// Returns [`BlobSourceError::NotFound`] when no entry exists for the key.
    async fn get(&self, kind: &str, version: &str) -> Result<Vec<u8>>;
}

/// Blob source backed by a directory tree of `<root>/<kind>/<version>.json`
#[derive(Debug, Clone)]
pub struct FsBlobSource {
    root: PathBuf,
}

impl FsBlobSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Location of the blob for `(kind, version)`, or `None` when either key
    /// component would resolve outside the root
    pub fn blob_path(&self, kind: &str, version: &str) -> Option<PathBuf> {
        if !is_plain_component(kind) || !is_plain_component(version) {
            return None;
        }
        Some(self.root.join(kind).join(format!("{}.json", version)))
    }
}

/// A key component must name a single entry directly below its parent
fn is_plain_component(s: &str) -> bool {
    !s.is_empty() && s != "." && s != ".." && !s.contains(['/', '\\', '\0'])
}

#[async_trait]
impl BlobSource for FsBlobSource {
    async fn get(&self, kind: &str, version: &str) -> Result<Vec<u8>> {
        let not_found = || BlobSourceError::NotFound {
            kind: kind.to_string(),
            version: version.to_string(),
        };

        let Some(path) = self.blob_path(kind, version) else {
            debug!(kind, version, "Rejected key outside blob root");
            return Err(not_found());
        };

        match fs::read(&path).await {
            Ok(data) => {
                debug!(path = ?path, size = data.len(), "Read blob");
                Ok(data)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = ?path, "Blob not found");
                Err(not_found())
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use tempfile::tempdir;

    async fn write_blob(root: &Path, kind: &str, version: &str, data: &[u8]) {
        let dir = root.join(kind);
        fs::create_dir_all(&dir).await.unwrap();
        fs::write(dir.join(format!("{}.json", version)), data)
            .await
            .unwrap();
    }

    #[test]
    fn test_blob_path_layout() {
        let source = FsBlobSource::new("/data/sample_files");
        assert_eq!(
            source.blob_path("core", "1.0.0"),
            Some(PathBuf::from("/data/sample_files/core/1.0.0.json"))
        );
    }

    #[test]
    fn test_blob_path_rejects_traversal() {
        let source = FsBlobSource::new("/data/sample_files");
        assert!(source.blob_path("..", "1.0.0").is_none());
        assert!(source.blob_path("core", "../../etc/passwd").is_none());
        assert!(source.blob_path("core/extra", "1.0.0").is_none());
        assert!(source.blob_path("", "1.0.0").is_none());
    }

    #[test]
    fn test_blob_path_accepts_arbitrary_names() {
        let source = FsBlobSource::new("/data");
        assert!(source.blob_path("core", "v2-beta+build.7").is_some());
        assert!(source.blob_path("...", "1.0.0").is_some());
    }

    #[tokio::test]
    async fn test_get_existing_blob() {
        let dir = tempdir().unwrap();
        write_blob(dir.path(), "core", "1.0.0", b"{\"hello\":\"world\"}").await;

        let source = FsBlobSource::new(dir.path());
        let data = source.get("core", "1.0.0").await.unwrap();
        assert_eq!(data, b"{\"hello\":\"world\"}");
    }

    #[tokio::test]
    async fn test_get_missing_blob() {
        let dir = tempdir().unwrap();
        let source = FsBlobSource::new(dir.path());

        let err = source.get("nonexistent", "1.0.0").await.unwrap_err();
        assert!(matches!(
            err,
            BlobSourceError::NotFound { ref kind, ref version }
                if kind == "nonexistent" && version == "1.0.0"
        ));
    }

    #[tokio::test]
    async fn test_get_traversal_is_not_found() {
        let dir = tempdir().unwrap();
        write_blob(dir.path(), "core", "secret", b"{}").await;
        let source = FsBlobSource::new(dir.path().join("core"));

        let err = source.get("..", "secret").await.unwrap_err();
        assert!(matches!(err, BlobSourceError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_get_is_not_cached() {
        let dir = tempdir().unwrap();
        write_blob(dir.path(), "core", "1.0.0", b"first").await;
        let source = FsBlobSource::new(dir.path());
        assert_eq!(source.get("core", "1.0.0").await.unwrap(), b"first");

        write_blob(dir.path(), "core", "1.0.0", b"second").await;
        assert_eq!(source.get("core", "1.0.0").await.unwrap(), b"second");
    }
}
