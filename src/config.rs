//! Configuration types.

use crate::error::ConfigError;

/// Server configuration, read from the environment with defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Address to bind the HTTP server on.
    pub bind_addr: String,
    /// Port to bind the HTTP server on.
    pub port: u16,
    /// Path to the local database file.
    pub db_path: String,
}

impl Config {
    /// Read configuration from environment variables.
    ///
    /// Unset variables fall back to defaults; a set-but-unparsable value
    /// is an error rather than a silent fallback.
    pub fn from_env() -> Result<Self, ConfigError> {
        let bind_addr =
            std::env::var("OPSTRACK_BIND_ADDR").unwrap_or_else(|_| "0.0.0.0".to_string());

        let port: u16 = match std::env::var("OPSTRACK_PORT") {
            Ok(raw) => raw.parse().map_err(|_| ConfigError::InvalidValue {
                key: "OPSTRACK_PORT".to_string(),
                message: format!("not a valid port number: {raw}"),
            })?,
            Err(_) => 8000,
        };

        let db_path = std::env::var("OPSTRACK_DB_PATH")
            .unwrap_or_else(|_| "./data/opstrack.db".to_string());

        Ok(Self {
            bind_addr,
            port,
            db_path,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0".to_string(),
            port: 8000,
            db_path: "./data/opstrack.db".to_string(),
        }
    }
}
