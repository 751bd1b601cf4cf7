//! Server configuration
//!
//! Read from the environment (after `.env` is loaded).

use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value:?}")]
    InvalidValue { key: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: IpAddr,
    pub port: u16,
    /// Page size used when a list request omits `limit`
    pub default_page_limit: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::from([0, 0, 0, 0]),
            port: 8000,
            default_page_limit: 100,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let config = Self {
            host: parse_or(&lookup, "HOST", defaults.host)?,
            port: parse_or(&lookup, "PORT", defaults.port)?,
            default_page_limit: parse_or(&lookup, "DEFAULT_PAGE_LIMIT", defaults.default_page_limit)?,
        };

        info!(
            "Config loaded: bind={}, default_page_limit={}",
            config.bind_addr(),
            config.default_page_limit
        );
        Ok(config)
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue { key, value }),
        None => Ok(default),
    }
}
