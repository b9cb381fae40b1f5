//! Configuration parsed from environment variables

use crate::error::{Result, RpcError};
use crate::types::RpcConfig;
use std::path::PathBuf;

pub const DEFAULT_PORT: u16 = 7350;
pub const DEFAULT_HTTP_KEY: &str = "defaulthttpkey";
pub const DEFAULT_DATA_DIR: &str = "./data/sample_files";

/// Load configuration from the process environment
pub fn load_config() -> Result<RpcConfig> {
    config_from(|key| std::env::var(key).ok())
}

/// Build configuration from an arbitrary variable lookup
pub fn config_from<F>(var: F) -> Result<RpcConfig>
where
    F: Fn(&str) -> Option<String>,
{
    // Support both DATABASE_URL and separate DB_* environment variables
    // (for compatibility with Cloud SQL socket connections)
    let database_url = match var("DATABASE_URL") {
        Some(url) => url,
        None => {
            let host = var("DB_HOST").ok_or_else(|| {
                RpcError::Config(
                    "DATABASE_URL or DB_HOST environment variable is required".to_string(),
                )
            })?;
            let name = var("DB_NAME").unwrap_or_else(|| "nakama".to_string());
            let user = var("DB_USER").unwrap_or_else(|| "postgres".to_string());
            let password = var("DB_PASSWORD").unwrap_or_default();

            if host.starts_with("/cloudsql/") {
                format!(
                    "postgresql://{}:{}@localhost/{}?host={}",
                    user, password, name, host
                )
            } else {
                let port = var("DB_PORT").unwrap_or_else(|| "5432".to_string());
                format!(
                    "postgresql://{}:{}@{}:{}/{}",
                    user, password, host, port, name
                )
            }
        }
    };

    let port = var("PORT")
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(DEFAULT_PORT);

    let db_max_connections = var("DB_MAX_CONNECTIONS")
        .and_then(|s| s.parse::<u32>().ok())
        .filter(|n| *n > 0)
        .unwrap_or(10);

    let data_dir = var("DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));

    let http_key = var("HTTP_KEY")
        .filter(|k| !k.is_empty())
        .unwrap_or_else(|| DEFAULT_HTTP_KEY.to_string());

    Ok(RpcConfig {
        port,
        database_url,
        db_max_connections,
        data_dir,
        http_key,
    })
}
