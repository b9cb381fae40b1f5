//! File Payload RPC - versioned file resolution with a write-once hash cache
//!
//! Serves the `process_file_payload` RPC: resolves a file by (type, version),
//! fingerprints it, and records the first resolution in PostgreSQL.

use file_blob_source::FsBlobSource;
use file_payload_rpc::{load_config, start_server, Engine, Result, RpcError, ServerState};
use payload_db::PgFileStore;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let env_filter =
        EnvFilter::from_default_env().add_directive("file_payload_rpc=info".parse()?);

    // Use JSON format for GCP Cloud Logging when LOG_FORMAT=json
    if std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false)
    {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_stackdriver::layer())
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    };

    info!("Starting File Payload RPC...");

    let config = load_config()?;
    info!("Port: {}", config.port);
    info!("Data dir: {:?}", config.data_dir);

    // Schema bootstrap runs once, before any request is served
    let store = PgFileStore::connect(&config.database_url, config.db_max_connections).await?;
    store.migrate().await?;

    let blobs = FsBlobSource::new(config.data_dir);
    let engine = Engine::new(Arc::new(store), Arc::new(blobs));
    let state = Arc::new(ServerState::new(engine, config.http_key));

    info!("Registered RPC: {}", file_payload_rpc::RPC_ID);
    start_server(state, config.port)
        .await
        .map_err(|e| RpcError::Config(format!("Server error: {}", e)))?;

    Ok(())
}
