//! Read-only blob source keyed by `(type, version)`
//!
//! Provides the [`BlobSource`] capability used to resolve logical files, a
//! filesystem-backed implementation laid out as `<root>/<type>/<version>.json`,
//! and the SHA-256 content fingerprint.

mod error;
mod fingerprint;
mod source;

pub use error::{BlobSourceError, Result};
pub use fingerprint::fingerprint;
pub use source::{BlobSource, FsBlobSource};
