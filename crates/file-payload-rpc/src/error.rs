//! Error types for the file payload RPC
//!
//! Resolution failures fall into three client-visible classes: malformed
//! input, file not found, and internal errors. Internal causes are logged
//! and never returned to the caller.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use payload_db::StoreError;
use serde_json::json;
use std::fmt;

pub const FILE_NOT_FOUND: &str = "file not found";
pub const INTERNAL_SERVER_ERROR: &str = "internal server error";

/// Status codes of the RPC runtime protocol
pub mod code {
    pub const INVALID_ARGUMENT: u32 = 3;
    pub const NOT_FOUND: u32 = 5;
    pub const INTERNAL: u32 = 13;
    pub const UNAUTHENTICATED: u32 = 16;
}

#[derive(Debug)]
pub enum RpcError {
    /// Payload could not be decoded; carries the decoder's message
    MalformedInput(String),
    /// The blob source has no content for the requested key
    NotFound,
    /// Store or blob source failure; the message is for logs only
    Internal(String),
    /// Missing or wrong HTTP key
    Unauthorized,
    /// No RPC function is registered under this id
    UnknownFunction(String),
    Config(String),
    Io(Box<std::io::Error>),
}

impl RpcError {
    pub fn status(&self) -> StatusCode {
        match self {
            RpcError::MalformedInput(_) => StatusCode::BAD_REQUEST,
            RpcError::NotFound | RpcError::UnknownFunction(_) => StatusCode::NOT_FOUND,
            RpcError::Unauthorized => StatusCode::UNAUTHORIZED,
            RpcError::Internal(_) | RpcError::Config(_) | RpcError::Io(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn code(&self) -> u32 {
        match self {
            RpcError::MalformedInput(_) => code::INVALID_ARGUMENT,
            RpcError::NotFound | RpcError::UnknownFunction(_) => code::NOT_FOUND,
            RpcError::Unauthorized => code::UNAUTHENTICATED,
            RpcError::Internal(_) | RpcError::Config(_) | RpcError::Io(_) => code::INTERNAL,
        }
    }

    /// Message returned to the caller
    pub fn client_message(&self) -> String {
        match self {
            RpcError::MalformedInput(msg) => msg.clone(),
            RpcError::NotFound => FILE_NOT_FOUND.to_string(),
            RpcError::Unauthorized => "HTTP key invalid".to_string(),
            RpcError::UnknownFunction(_) => "RPC function not found".to_string(),
            RpcError::Internal(_) | RpcError::Config(_) | RpcError::Io(_) => {
                INTERNAL_SERVER_ERROR.to_string()
            }
        }
    }
}

impl fmt::Display for RpcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RpcError::MalformedInput(msg) => write!(f, "Malformed input: {}", msg),
            RpcError::NotFound => write!(f, "{}", FILE_NOT_FOUND),
            RpcError::Internal(msg) => write!(f, "Internal error: {}", msg),
            RpcError::Unauthorized => write!(f, "Unauthorized"),
            RpcError::UnknownFunction(id) => write!(f, "Unknown RPC function: {}", id),
            RpcError::Config(msg) => write!(f, "Configuration error: {}", msg),
            RpcError::Io(err) => write!(f, "IO error: {}", err),
        }
    }
}

impl std::error::Error for RpcError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RpcError::Io(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

impl IntoResponse for RpcError {
    fn into_response(self) -> Response {
        match &self {
            RpcError::Internal(_) | RpcError::Config(_) | RpcError::Io(_) => {
                tracing::error!(error = %self, "Internal server error");
            }
            _ => tracing::debug!(error = %self, "RPC request rejected"),
        }

        let message = self.client_message();
        let body = json!({
            "error": message,
            "message": message,
            "code": self.code(),
        });
        (self.status(), axum::Json(body)).into_response()
    }
}

impl From<StoreError> for RpcError {
    fn from(err: StoreError) -> Self {
        RpcError::Internal(err.to_string())
    }
}

impl From<std::io::Error> for RpcError {
    fn from(err: std::io::Error) -> Self {
        RpcError::Io(Box::new(err))
    }
}

impl From<tracing_subscriber::filter::ParseError> for RpcError {
    fn from(err: tracing_subscriber::filter::ParseError) -> Self {
        RpcError::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, RpcError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_three_way_status_mapping() {
        assert_eq!(
            RpcError::MalformedInput("bad".to_string()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(RpcError::NotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            RpcError::Internal("db down".to_string()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_runtime_codes() {
        assert_eq!(RpcError::MalformedInput(String::new()).code(), 3);
        assert_eq!(RpcError::NotFound.code(), 5);
        assert_eq!(RpcError::Internal(String::new()).code(), 13);
        assert_eq!(RpcError::Unauthorized.code(), 16);
    }

    #[test]
    fn test_malformed_input_message_is_verbatim() {
        let err = RpcError::MalformedInput("expected value at line 1 column 1".to_string());
        assert_eq!(err.client_message(), "expected value at line 1 column 1");
    }

    #[test]
    fn test_internal_message_does_not_leak() {
        let err = RpcError::Internal("connection refused (os error 111)".to_string());
        assert_eq!(err.client_message(), "internal server error");
        assert!(format!("{}", err).contains("connection refused"));
    }

    #[test]
    fn test_store_error_is_internal() {
        let err = RpcError::from(StoreError::KeyConflict {
            kind: "core".to_string(),
            version: "1.0.0".to_string(),
        });
        assert!(matches!(err, RpcError::Internal(_)));
        assert_eq!(err.code(), 13);
    }

    #[tokio::test]
    async fn test_not_found_response_body() {
        let response = RpcError::NotFound.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["message"], "file not found");
        assert_eq!(json["error"], "file not found");
        assert_eq!(json["code"], 5);
    }
}
