//! Core types for the file payload RPC

use serde::de::{self, Deserializer, IgnoredAny, MapAccess, Visitor};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Sentinel meaning "no value", in both requests and responses
pub const NULL_SENTINEL: &str = "null";

pub const DEFAULT_KIND: &str = "core";
pub const DEFAULT_VERSION: &str = "1.0.0";

/// Request payload as decoded from the wire. Every field may be absent.
///
/// Only a JSON object decodes. Keys match case-insensitively, a `null` value
/// leaves the field untouched, and a repeated key keeps its last value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawPayload {
    pub kind: Option<String>,
    pub version: Option<String>,
    pub hash: Option<String>,
}

impl<'de> Deserialize<'de> for RawPayload {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(RawPayloadVisitor)
    }
}

struct RawPayloadVisitor;

impl<'de> Visitor<'de> for RawPayloadVisitor {
    type Value = RawPayload;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a JSON object")
    }

    fn visit_map<A>(self, mut map: A) -> std::result::Result<RawPayload, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut raw = RawPayload::default();
        while let Some(key) = map.next_key::<String>()? {
            let slot = if key.eq_ignore_ascii_case("type") {
                &mut raw.kind
            } else if key.eq_ignore_ascii_case("version") {
                &mut raw.version
            } else if key.eq_ignore_ascii_case("hash") {
                &mut raw.hash
            } else {
                map.next_value::<IgnoredAny>()?;
                continue;
            };

            let value: Option<String> = map
                .next_value()
                .map_err(|e| <A::Error as de::Error>::custom(format!("field \"{}\": {}", key, e)))?;
            if value.is_some() {
                *slot = value;
            }
        }
        Ok(raw)
    }
}

/// Request with defaults applied; all fields are non-empty
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRequest {
    pub kind: String,
    pub version: String,
    pub client_hash: String,
}

impl FileRequest {
    pub fn new(
        kind: impl Into<String>,
        version: impl Into<String>,
        client_hash: impl Into<String>,
    ) -> Self {
        Self {
            kind: kind.into(),
            version: version.into(),
            client_hash: client_hash.into(),
        }
    }
}

impl From<RawPayload> for FileRequest {
    fn from(raw: RawPayload) -> Self {
        fn or_default(value: Option<String>, default: &str) -> String {
            value
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| default.to_string())
        }

        Self {
            kind: or_default(raw.kind, DEFAULT_KIND),
            version: or_default(raw.version, DEFAULT_VERSION),
            client_hash: or_default(raw.hash, NULL_SENTINEL),
        }
    }
}

/// Response payload. `hash` and `content` are either both real values or
/// both [`NULL_SENTINEL`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileResponse {
    #[serde(rename = "type")]
    pub kind: String,
    pub version: String,
    #[serde(rename = "hash")]
    pub fingerprint: String,
    pub content: String,
}

impl FileResponse {
    pub fn disclosed(request: &FileRequest, fingerprint: String, content: String) -> Self {
        Self {
            kind: request.kind.clone(),
            version: request.version.clone(),
            fingerprint,
            content,
        }
    }

    pub fn suppressed(request: &FileRequest) -> Self {
        Self {
            kind: request.kind.clone(),
            version: request.version.clone(),
            fingerprint: NULL_SENTINEL.to_string(),
            content: NULL_SENTINEL.to_string(),
        }
    }

    pub fn is_suppressed(&self) -> bool {
        self.fingerprint == NULL_SENTINEL && self.content == NULL_SENTINEL
    }
}

/// Configuration for the RPC service
#[derive(Debug, Clone)]
pub struct RpcConfig {
    pub port: u16,
    pub database_url: String,
    pub db_max_connections: u32,
    pub data_dir: PathBuf,
    pub http_key: String,
}

/// Request counters since process start
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RpcStats {
    pub requests: u64,
    pub disclosed: u64,
    pub suppressed: u64,
    pub records_written: u64,
    pub conflicts_recovered: u64,
    pub errors: u64,
}

/// Successful RPC envelope; `payload` is the JSON-encoded [`FileResponse`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcResponse {
    pub payload: String,
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub uptime_secs: u64,
    pub stats: RpcStats,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_payload_decodes_object() {
        let raw: RawPayload =
            serde_json::from_str(r#"{"type":"core","version":"2.0.0","hash":"abc","x":[1]}"#)
                .unwrap();
        assert_eq!(raw.kind.as_deref(), Some("core"));
        assert_eq!(raw.version.as_deref(), Some("2.0.0"));
        assert_eq!(raw.hash.as_deref(), Some("abc"));
    }

    #[test]
    fn test_raw_payload_rejects_sequences() {
        assert!(serde_json::from_str::<RawPayload>("[]").is_err());
        assert!(serde_json::from_str::<RawPayload>(r#"["a","b","c"]"#).is_err());
        assert!(serde_json::from_str::<RawPayload>("\"core\"").is_err());
    }

    #[test]
    fn test_raw_payload_keys_are_case_insensitive() {
        let raw: RawPayload =
            serde_json::from_str(r#"{"Type":"skins","VERSION":"3.1.0","Hash":"h"}"#).unwrap();
        assert_eq!(raw.kind.as_deref(), Some("skins"));
        assert_eq!(raw.version.as_deref(), Some("3.1.0"));
        assert_eq!(raw.hash.as_deref(), Some("h"));
    }

    #[test]
    fn test_raw_payload_repeated_key_keeps_last() {
        let raw: RawPayload =
            serde_json::from_str(r#"{"type":"first","Type":"second"}"#).unwrap();
        assert_eq!(raw.kind.as_deref(), Some("second"));

        let raw: RawPayload = serde_json::from_str(r#"{"type":"kept","type":null}"#).unwrap();
        assert_eq!(raw.kind.as_deref(), Some("kept"));
    }

    #[test]
    fn test_raw_payload_rejects_non_string_field() {
        let err = serde_json::from_str::<RawPayload>(r#"{"version":1}"#).unwrap_err();
        assert!(err.to_string().contains("version"));
    }

    #[test]
    fn test_request_defaults_for_missing_fields() {
        let request = FileRequest::from(RawPayload::default());
        assert_eq!(request, FileRequest::new("core", "1.0.0", "null"));
    }

    #[test]
    fn test_request_defaults_for_empty_fields() {
        let request = FileRequest::from(RawPayload {
            kind: Some(String::new()),
            version: Some(String::new()),
            hash: Some(String::new()),
        });
        assert_eq!(request, FileRequest::new("core", "1.0.0", "null"));
    }

    #[test]
    fn test_request_keeps_supplied_fields_verbatim() {
        let request = FileRequest::from(RawPayload {
            kind: Some("Weird Kind".to_string()),
            version: Some("not-semver".to_string()),
            hash: Some("abc".to_string()),
        });
        assert_eq!(request, FileRequest::new("Weird Kind", "not-semver", "abc"));
    }

    #[test]
    fn test_response_wire_field_names() {
        let request = FileRequest::new("core", "1.0.0", "null");
        let response = FileResponse::disclosed(&request, "abc".to_string(), "{}".to_string());

        let json: serde_json::Value = serde_json::to_value(&response).unwrap();
        assert_eq!(json["type"], "core");
        assert_eq!(json["version"], "1.0.0");
        assert_eq!(json["hash"], "abc");
        assert_eq!(json["content"], "{}");
    }

    #[test]
    fn test_suppressed_response() {
        let request = FileRequest::new("core", "1.0.0", "stale");
        let response = FileResponse::suppressed(&request);
        assert!(response.is_suppressed());
        assert_eq!(response.kind, "core");
        assert_eq!(response.version, "1.0.0");
    }

    #[test]
    fn test_stats_default() {
        let stats = RpcStats::default();
        assert_eq!(stats.requests, 0);
        assert_eq!(stats.errors, 0);
    }
}
