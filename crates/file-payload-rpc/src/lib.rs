//! File Payload RPC Library
//!
//! Resolves logical files by `(type, version)`, fingerprints their content,
//! and records the first resolution of every key in a write-once store.

pub mod config;
pub mod engine;
pub mod error;
pub mod server;
pub mod types;

pub use config::load_config;
pub use engine::{normalize, Engine};
pub use error::{Result, RpcError};
pub use server::{create_router, start_server, ServerState, SharedState, RPC_ID};
pub use types::*;
