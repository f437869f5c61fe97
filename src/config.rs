//! Configuration management for the storage bridge
//!
//! Separates startup configuration (requires restart) from runtime configuration
//! (can be updated from the operator console while the bridge is running).

use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::storage::validation::is_relative_namespace;

/// Complete bridge configuration with startup/runtime separation
#[derive(Debug, Deserialize, Clone)]
pub struct BridgeConfig {
    #[serde(flatten)]
    pub startup: StartupConfig,

    #[serde(flatten)]
    pub runtime: RuntimeConfig,
}

/// Configuration that requires a restart to take effect
#[derive(Debug, Deserialize, Clone)]
pub struct StartupConfig {
    // ═══ NETWORK (Environment Override Supported) ═══
    /// IP address the method channel listens on
    pub bind_address: String,

    /// Port for the method channel
    pub port: u16,

    // ═══ SHARED STORAGE ═══
    /// Root of the shared media store
    pub storage_root: String,

    /// Logical folder under the storage root that receives every ingested entry
    pub namespace: String,

    /// Platform API level; namespaced inserts need 29 or newer
    pub api_level: u32,

    // ═══ INTERNAL BEHAVIOR (TOML Only) ═══
    /// Buffer size for streaming source bytes into an entry
    pub buffer_size: usize,

    /// Longest accepted method-call line, in bytes
    pub max_request_length: usize,

    /// Record a `title` alongside the display name in entry metadata
    #[serde(default = "default_include_title")]
    pub include_title: bool,

    /// Default log filter when RUST_LOG is not set
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Configuration that can be updated at runtime
#[derive(Debug, Deserialize, Clone)]
pub struct RuntimeConfig {
    /// Largest source file accepted for ingestion, in MB
    /// Environment: STORAGE_BRIDGE_MAX_FILE_SIZE_MB
    pub max_file_size_mb: u64,

    /// Delete an entry whose copy failed halfway
    #[serde(default = "default_cleanup")]
    pub cleanup_partial_entries: bool,
}

/// Largest accepted `max_file_size_mb` (1 TiB)
pub const MAX_FILE_SIZE_MB_LIMIT: u64 = 1024 * 1024;

/// Thread-safe runtime configuration wrapper
pub type SharedRuntimeConfig = Arc<RwLock<RuntimeConfig>>;

fn default_include_title() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_cleanup() -> bool {
    true
}

impl BridgeConfig {
    /// Load configuration from config.toml with environment overrides
    pub fn load() -> Result<Self, config::ConfigError> {
        let config_paths = ["storage-bridge/config", "config"];

        let mut last_error = None;

        for config_path in &config_paths {
            match Config::builder()
                .add_source(File::with_name(config_path))
                .add_source(Environment::with_prefix("STORAGE_BRIDGE").try_parsing(true))
                .build()
            {
                Ok(settings) => {
                    let config: BridgeConfig = settings.try_deserialize()?;
                    config.validate()?;
                    return Ok(config);
                }
                Err(e) => {
                    last_error = Some(e);
                    continue;
                }
            }
        }

        Err(config::ConfigError::Message(format!(
            "Failed to load config.toml from any location. Tried: {config_paths:?}. Last error: {last_error:?}"
        )))
    }

    /// Split into startup (immutable) and runtime (mutable) parts
    pub fn split(self) -> (StartupConfig, SharedRuntimeConfig) {
        let runtime = Arc::new(RwLock::new(self.runtime));
        (self.startup, runtime)
    }

    /// Validation for all configuration values
    pub fn validate(&self) -> Result<(), config::ConfigError> {
        if self.startup.port == 0 {
            return Err(config::ConfigError::Message("port cannot be 0".into()));
        }

        if self.startup.storage_root.trim().is_empty() {
            return Err(config::ConfigError::Message(
                "storage_root cannot be empty".into(),
            ));
        }

        if !is_relative_namespace(&self.startup.namespace) {
            return Err(config::ConfigError::Message(format!(
                "namespace must be a non-empty relative path without '..': {}",
                self.startup.namespace
            )));
        }

        if self.startup.buffer_size == 0 {
            return Err(config::ConfigError::Message(
                "buffer_size must be greater than 0".into(),
            ));
        }

        if self.startup.max_request_length == 0 {
            return Err(config::ConfigError::Message(
                "max_request_length must be greater than 0".into(),
            ));
        }

        if self.runtime.max_file_size_mb == 0 {
            return Err(config::ConfigError::Message(
                "max_file_size_mb must be greater than 0".into(),
            ));
        }

        if self.runtime.max_file_size_mb > MAX_FILE_SIZE_MB_LIMIT {
            return Err(config::ConfigError::Message(format!(
                "max_file_size_mb must be at most {}",
                MAX_FILE_SIZE_MB_LIMIT
            )));
        }

        Ok(())
    }
}

impl StartupConfig {
    /// Get bind address and port as a socket address string
    pub fn channel_socket(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }

    /// Get the storage root as PathBuf
    pub fn storage_root_path(&self) -> PathBuf {
        PathBuf::from(&self.storage_root)
    }
}

impl RuntimeConfig {
    /// Get maximum file size in bytes
    pub fn max_file_size_bytes(&self) -> u64 {
        self.max_file_size_mb.saturating_mul(1024 * 1024)
    }
}
