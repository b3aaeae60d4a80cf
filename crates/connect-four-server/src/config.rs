//! Server configuration read from the environment.

use std::net::SocketAddr;
use thiserror::Error;

const DEFAULT_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid SERVER_ADDR {value:?}: {source}")]
    InvalidAddr {
        value: String,
        source: std::net::AddrParseError,
    },
}

/// Settings for one server process
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Address to listen on (`SERVER_ADDR`)
    pub addr: SocketAddr,
    /// Tracing filter directive (`RUST_LOG`)
    pub log_filter: String,
}

impl ServerConfig {
    /// Load from `SERVER_ADDR` and `RUST_LOG`, falling back to defaults
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(
            std::env::var("SERVER_ADDR").ok(),
            std::env::var("RUST_LOG").ok(),
        )
    }

    fn from_vars(addr: Option<String>, log_filter: Option<String>) -> Result<Self, ConfigError> {
        let addr = addr.unwrap_or_else(|| DEFAULT_ADDR.into());
        let addr = addr
            .parse()
            .map_err(|source| ConfigError::InvalidAddr { value: addr.clone(), source })?;

        Ok(Self {
            addr,
            log_filter: log_filter.unwrap_or_else(|| DEFAULT_LOG_FILTER.into()),
        })
    }
}
