//! HTTP server for the RPC endpoint
//!
//! Provides /health and /v2/rpc/{id} endpoints.

use crate::engine::Engine;
use crate::error::{Result, RpcError};
use crate::types::{HealthResponse, RpcResponse};
use axum::{
    extract::{Path, Query, State},
    response::Json,
    routing::{get, post},
    Router,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::{debug, info};

/// Id under which the file payload function is registered
pub const RPC_ID: &str = "process_file_payload";

/// Shared state for the HTTP server
pub struct ServerState {
    pub engine: Engine,
    pub http_key: String,
    pub started_at: DateTime<Utc>,
}

impl ServerState {
    pub fn new(engine: Engine, http_key: impl Into<String>) -> Self {
        Self {
            engine,
            http_key: http_key.into(),
            started_at: Utc::now(),
        }
    }
}

pub type SharedState = Arc<ServerState>;

/// RPC query parameters
#[derive(Debug, Deserialize)]
pub struct RpcQuery {
    #[serde(default)]
    http_key: Option<String>,
    /// When present the body is the payload itself rather than a JSON string
    #[serde(default)]
    unwrap: Option<String>,
}

/// Create the HTTP router
pub fn create_router(state: SharedState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/v2/rpc/{id}", post(call_rpc))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Start the HTTP server
pub async fn start_server(state: SharedState, port: u16) -> std::io::Result<()> {
    let router = create_router(state);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    info!("Starting HTTP server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await
}

/// Health check endpoint
async fn health(State(state): State<SharedState>) -> Json<HealthResponse> {
    let uptime_secs = (Utc::now() - state.started_at).num_seconds().max(0) as u64;

    Json(HealthResponse {
        status: "ok".to_string(),
        uptime_secs,
        stats: state.engine.stats(),
    })
}

/// Invoke a registered RPC function
async fn call_rpc(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Query(query): Query<RpcQuery>,
    body: String,
) -> Result<Json<RpcResponse>> {
    if query.http_key.as_deref() != Some(state.http_key.as_str()) {
        return Err(RpcError::Unauthorized);
    }
    if id != RPC_ID {
        return Err(RpcError::UnknownFunction(id));
    }

    debug!(id = %id, "RPC call");
    let payload = extract_payload(&body, query.unwrap.is_some())?;
    let payload = state.engine.process_payload(&payload).await?;
    Ok(Json(RpcResponse { payload }))
}

/// The payload travels as a JSON string unless the caller asked for the raw
/// body to be used as-is
fn extract_payload(body: &str, unwrap: bool) -> Result<String> {
    if unwrap || body.trim().is_empty() {
        return Ok(body.to_string());
    }
    serde_json::from_str::<String>(body).map_err(|e| RpcError::MalformedInput(e.to_string()))
}
