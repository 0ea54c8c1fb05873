//! Environment-driven configuration.

use std::net::SocketAddr;
use std::path::PathBuf;

/// Default listen address.
pub const DEFAULT_ADDR: &str = "0.0.0.0:8920";

/// Default data directory, relative to the working directory.
pub const DEFAULT_DATA_DIR: &str = "data";

/// Server configuration, read from `CHUNKD_ADDR` and `CHUNKD_DATA_DIR`.
#[derive(Debug, Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub data_dir: PathBuf,
}

/// Errors from configuration parsing.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid CHUNKD_ADDR {0:?}: {1}")]
    InvalidAddr(String, std::net::AddrParseError),
}

impl Config {
    /// Reads configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(
            std::env::var("CHUNKD_ADDR").ok(),
            std::env::var("CHUNKD_DATA_DIR").ok(),
        )
    }

    fn from_vars(addr: Option<String>, data_dir: Option<String>) -> Result<Self, ConfigError> {
        let addr_raw = addr.unwrap_or_else(|| DEFAULT_ADDR.to_string());
        let addr = addr_raw
            .parse()
            .map_err(|e| ConfigError::InvalidAddr(addr_raw, e))?;
        let data_dir = PathBuf::from(data_dir.unwrap_or_else(|| DEFAULT_DATA_DIR.to_string()));
        Ok(Self { addr, data_dir })
    }

    /// Directory holding the per-signature staging files.
    pub fn upload_dir(&self) -> PathBuf {
        self.data_dir.join("uploads")
    }

    /// Directory holding the per-signature registry records.
    pub fn meta_dir(&self) -> PathBuf {
        self.data_dir.join("meta")
    }
}
