//! Service configuration.
//!
//! Layered with the `config` crate, later sources winning:
//!
//! 1. built-in defaults
//! 2. `memverse-upload.toml` in the working directory (optional)
//! 3. `MEMVERSE_*` environment variables, e.g. `MEMVERSE_PORT=8080`,
//!    `MEMVERSE_DATABASE_PATH=/var/lib/memverse/uploads.db`

use std::path::{Path, PathBuf};

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::error::{Result, UploadError};

/// Default config file name.
pub const CONFIG_FILE: &str = "memverse-upload.toml";

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "MEMVERSE";

/// Upload service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    /// Interface to bind.
    #[serde(default = "default_host")]
    pub host: String,
    /// TCP port.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Directory uploaded blobs are written to.
    #[serde(default = "default_upload_dir")]
    pub upload_dir: PathBuf,
    /// SQLite metadata database.
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,
    /// Per-file size cap in bytes.
    #[serde(default = "default_max_file_size")]
    pub max_file_size: usize,
    /// Files accepted by one `upload-multiple` request.
    #[serde(default = "default_max_files")]
    pub max_files: usize,
    /// Enable WAL journal mode.
    #[serde(default = "default_true")]
    pub wal_mode: bool,
    /// Default log filter when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Emit JSON log lines instead of human-readable ones.
    #[serde(default)]
    pub json_logs: bool,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            upload_dir: default_upload_dir(),
            database_path: default_database_path(),
            max_file_size: default_max_file_size(),
            max_files: default_max_files(),
            wal_mode: true,
            log_level: default_log_level(),
            json_logs: false,
        }
    }
}

impl UploadConfig {
    /// Load from `memverse-upload.toml` and the environment.
    ///
    /// # Errors
    /// Returns `UploadError::Config` if a source is malformed or the result
    /// fails validation.
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new(CONFIG_FILE))
    }

    /// Load from a specific file (which may be absent) and the environment.
    ///
    /// # Errors
    /// Returns `UploadError::Config` if a source is malformed or the result
    /// fails validation.
    pub fn load_from(path: &Path) -> Result<Self> {
        let settings = Config::builder()
            .add_source(File::from(path).required(false))
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()
            .map_err(|e| UploadError::Config(e.to_string()))?;
        let config: Self = settings
            .try_deserialize()
            .map_err(|e| UploadError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate invariants.
    ///
    /// # Errors
    /// Returns `UploadError::Config` naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        if self.max_file_size == 0 {
            return Err(UploadError::Config("max_file_size must be positive".to_string()));
        }
        if self.max_files == 0 {
            return Err(UploadError::Config("max_files must be positive".to_string()));
        }
        Ok(())
    }

    /// `host:port` for the listener.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 3000 }
fn default_upload_dir() -> PathBuf { PathBuf::from("uploads") }
fn default_database_path() -> PathBuf { PathBuf::from("memverse-uploads.db") }
fn default_max_file_size() -> usize { 10 * 1024 * 1024 }
fn default_max_files() -> usize { 5 }
fn default_true() -> bool { true }
fn default_log_level() -> String { "info".to_string() }
