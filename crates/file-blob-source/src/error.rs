//! Error types for blob resolution

use std::fmt;

#[derive(Debug)]
pub enum BlobSourceError {
    /// No blob exists for the requested key
    NotFound { kind: String, version: String },
    Io(Box<std::io::Error>),
}

impl fmt::Display for BlobSourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlobSourceError::NotFound { kind, version } => {
                write!(f, "Blob not found: {}/{}", kind, version)
            }
            BlobSourceError::Io(err) => write!(f, "IO error: {}", err),
        }
    }
}

impl std::error::Error for BlobSourceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BlobSourceError::Io(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

impl From<std::io::Error> for BlobSourceError {
    fn from(err: std::io::Error) -> Self {
        BlobSourceError::Io(Box::new(err))
    }
}

pub type Result<T> = std::result::Result<T, BlobSourceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_display() {
        let err = BlobSourceError::NotFound {
            kind: "core".to_string(),
            version: "1.0.0".to_string(),
        };
        assert_eq!(format!("{}", err), "Blob not found: core/1.0.0");
    }

    #[test]
    fn test_io_error_has_source() {
        let err = BlobSourceError::from(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "denied",
        ));
        assert!(format!("{}", err).contains("denied"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
