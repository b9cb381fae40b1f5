//! Request resolution and the write-once cache protocol
//!
//! Every request re-reads its blob and re-computes the fingerprint. The store
//! only decides whether a record must be written and whether the response may
//! disclose the content:
//!
//! | prior record | client hash == computed | write | disclose |
//! |--------------|-------------------------|-------|----------|
//! | none         | any                     | yes   | yes      |
//! | exists       | yes                     | no    | yes      |
//! | exists       | no                      | no    | no       |

use crate::error::{Result, RpcError};
use crate::types::{FileRequest, FileResponse, RawPayload, RpcStats};
use chrono::Utc;
use file_blob_source::{fingerprint, BlobSource, BlobSourceError};
use payload_db::{FileStore, NewFileRecord, StoreError};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Decode a raw payload string and apply field defaults
pub fn normalize(payload: &str) -> Result<FileRequest> {
    // A JSON `null` payload decodes to no fields at all
    let raw: Option<RawPayload> =
        serde_json::from_str(payload).map_err(|e| RpcError::MalformedInput(e.to_string()))?;
    Ok(raw.unwrap_or_default().into())
}

/// Whether a record existed for the key before this request wrote anything
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PriorState {
    NoRecord,
    RecordExists,
}

#[derive(Debug, Default)]
struct Counters {
    requests: AtomicU64,
    disclosed: AtomicU64,
    suppressed: AtomicU64,
    records_written: AtomicU64,
    conflicts_recovered: AtomicU64,
    errors: AtomicU64,
}

/// Resolution-and-cache engine
pub struct Engine {
    store: Arc<dyn FileStore>,
    blobs: Arc<dyn BlobSource>,
    counters: Counters,
}

impl Engine {
    pub fn new(store: Arc<dyn FileStore>, blobs: Arc<dyn BlobSource>) -> Self {
        Self {
            store,
            blobs,
            counters: Counters::default(),
        }
    }

    /// Full RPC function body: decode, resolve, encode
    pub async fn process_payload(&self, payload: &str) -> Result<String> {
        debug!(payload, "Processing payload");
        let request = match normalize(payload) {
            Ok(request) => request,
            Err(e) => {
                self.counters.requests.fetch_add(1, Ordering::Relaxed);
                self.counters.errors.fetch_add(1, Ordering::Relaxed);
                return Err(e);
            }
        };

        let response = self.process(&request).await?;
        serde_json::to_string(&response).map_err(|e| {
            self.counters.errors.fetch_add(1, Ordering::Relaxed);
            RpcError::Internal(format!("encoding response: {}", e))
        })
    }

    /// Resolve a normalized request
    pub async fn process(&self, request: &FileRequest) -> Result<FileResponse> {
        self.counters.requests.fetch_add(1, Ordering::Relaxed);
        let result = self.resolve(request).await;
        match &result {
            Ok(response) if response.is_suppressed() => {
                self.counters.suppressed.fetch_add(1, Ordering::Relaxed);
            }
            Ok(_) => {
                self.counters.disclosed.fetch_add(1, Ordering::Relaxed);
            }
            Err(_) => {
                self.counters.errors.fetch_add(1, Ordering::Relaxed);
            }
        }
        result
    }

    async fn resolve(&self, request: &FileRequest) -> Result<FileResponse> {
        let kind = request.kind.as_str();
        let version = request.version.as_str();

        let bytes = match self.blobs.get(kind, version).await {
            Ok(bytes) => bytes,
            Err(BlobSourceError::NotFound { .. }) => {
                warn!(kind, version, "File not found");
                return Err(RpcError::NotFound);
            }
            Err(e) => {
                error!(kind, version, error = %e, "Failed to read file");
                return Err(RpcError::Internal(format!("reading {}/{}: {}", kind, version, e)));
            }
        };

        let computed = fingerprint(&bytes);
        let content = String::from_utf8_lossy(&bytes).into_owned();
        debug!(kind, version, fingerprint = %computed, "Computed fingerprint");

        let prior = match self.store.find_by_key(kind, version).await {
            Ok(Some(record)) => {
                info!(
                    kind,
                    version,
                    stored = %record.fingerprint,
                    "Record already exists, skipping save"
                );
                PriorState::RecordExists
            }
            Ok(None) => self.write_record(request, &computed, &content).await?,
            Err(e) => {
                error!(kind, version, error = %e, "Failed to query store");
                return Err(e.into());
            }
        };

        let disclose = prior == PriorState::NoRecord || request.client_hash == computed;
        debug!(kind, version, ?prior, disclose, "Reveal decision");

        if disclose {
            Ok(FileResponse::disclosed(request, computed, content))
        } else {
            Ok(FileResponse::suppressed(request))
        }
    }

    /// Insert the first record for the key. A concurrent writer that got there
    /// first turns this request into a `RecordExists` one.
    async fn write_record(
        &self,
        request: &FileRequest,
        computed: &str,
        content: &str,
    ) -> Result<PriorState> {
        let kind = request.kind.as_str();
        let version = request.version.as_str();

        let record = NewFileRecord {
            kind: request.kind.clone(),
            version: request.version.clone(),
            content: content.to_string(),
            fingerprint: computed.to_string(),
            stored_at: Utc::now(),
        };

        match self.store.insert_if_absent(&record).await {
            Ok(()) => {
                self.counters.records_written.fetch_add(1, Ordering::Relaxed);
                info!(kind, version, fingerprint = %computed, "Saved file record");
                Ok(PriorState::NoRecord)
            }
            Err(StoreError::KeyConflict { .. }) => {
                self.counters
                    .conflicts_recovered
                    .fetch_add(1, Ordering::Relaxed);
                warn!(kind, version, "Lost insert race, re-reading record");
                match self.store.find_by_key(kind, version).await {
                    Ok(Some(_)) => {}
                    Ok(None) => {
                        warn!(kind, version, "Conflicting record vanished before re-read");
                    }
                    Err(e) => {
                        error!(kind, version, error = %e, "Failed to re-read record");
                        return Err(e.into());
                    }
                }
                Ok(PriorState::RecordExists)
            }
            Err(e) => {
                error!(kind, version, error = %e, "Failed to save file record");
                Err(e.into())
            }
        }
    }

    /// Snapshot of the request counters
    pub fn stats(&self) -> RpcStats {
        let c = &self.counters;
        RpcStats {
            requests: c.requests.load(Ordering::Relaxed),
            disclosed: c.disclosed.load(Ordering::Relaxed),
            suppressed: c.suppressed.load(Ordering::Relaxed),
            records_written: c.records_written.load(Ordering::Relaxed),
            conflicts_recovered: c.conflicts_recovered.load(Ordering::Relaxed),
            errors: c.errors.load(Ordering::Relaxed),
        }
    }
}
