//! Server configuration

use crate::cursor::StartMode;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Everything needed to start the annotation server
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address to listen on
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// Reference catalog document (.json, .yaml or .yml)
    pub catalog_path: PathBuf,

    /// SQLite database holding the edges table
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// Where the cursor starts
    #[serde(default)]
    pub start_mode: StartMode,

    /// SQLite busy timeout
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,

    /// Upper bound on a single request's storage work
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    /// Log filter used when RUST_LOG is unset
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_bind_address() -> String {
    "127.0.0.1:5000".to_string()
}

fn default_busy_timeout_ms() -> u64 {
    5_000
}

fn default_request_timeout_ms() -> u64 {
    10_000
}

fn default_log_level() -> String {
    "info,holdgraph=debug".to_string()
}

/// Default database path (~/.local/share/holdgraph/edges.db)
pub fn default_db_path() -> PathBuf {
    let data_dir = dirs::data_dir()
        .unwrap_or_else(|| dirs::home_dir().unwrap_or_default().join(".local/share"));
    data_dir.join("holdgraph").join("edges.db")
}

impl ServerConfig {
    /// Defaults for everything but the catalog
    pub fn new(catalog_path: impl Into<PathBuf>) -> Self {
        Self {
            bind_address: default_bind_address(),
            catalog_path: catalog_path.into(),
            db_path: default_db_path(),
            start_mode: StartMode::default(),
            busy_timeout_ms: default_busy_timeout_ms(),
            request_timeout_ms: default_request_timeout_ms(),
            log_level: default_log_level(),
        }
    }

    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}
