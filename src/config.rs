use std::{env, net::SocketAddr};

use thiserror::Error;

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1";
pub const DEFAULT_BIND_PORT: u16 = 8080;
pub const DEFAULT_DATABASE_PATH: &str = "transactions.db";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub bind_addr: String,
    pub bind_port: u16,
    pub database_path: String,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("BIND_PORT must be a valid u16")]
    InvalidPort,
    #[error("DATABASE_PATH must not be empty")]
    MissingDatabasePath,
    #[error("invalid bind address or port")]
    InvalidSocket,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup, so tests do not touch the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bind_addr = lookup("BIND_ADDR")
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_port = lookup("BIND_PORT")
            .map(|value| {
                value
                    .trim()
                    .parse::<u16>()
                    .map_err(|_| ConfigError::InvalidPort)
            })
            .transpose()?
            .unwrap_or(DEFAULT_BIND_PORT);
        let database_path = match lookup("DATABASE_PATH") {
            Some(value) if value.trim().is_empty() => {
                return Err(ConfigError::MissingDatabasePath)
            }
            Some(value) => value.trim().to_string(),
            None => DEFAULT_DATABASE_PATH.to_string(),
        };

        let config = Self {
            bind_addr,
            bind_port,
            database_path,
        };

        let _ = config.bind_socket()?;
        Ok(config)
    }

    pub fn bind_socket(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.bind_addr, self.bind_port)
            .parse::<SocketAddr>()
            .map_err(|_| ConfigError::InvalidSocket)
    }
}
