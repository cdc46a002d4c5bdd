//! Server configuration loaded from the environment.

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{Context, Result};

/// Default bind address when `BIND_ADDR` is not set.
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

/// Default fetch timeout in seconds when `FETCH_TIMEOUT_SECS` is not set.
const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 30;

/// Runtime configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// PostgreSQL connection string.
    pub database_url: String,
    /// Address the HTTP server listens on.
    pub bind_addr: SocketAddr,
    /// Upper bound for a single document fetch.
    pub fetch_timeout: Duration,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// `DATABASE_URL` is required; `BIND_ADDR` and `FETCH_TIMEOUT_SECS`
    /// fall back to defaults.
    pub fn from_env() -> Result<Self> {
        let database_url =
            std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;

        let bind_addr = std::env::var("BIND_ADDR")
            .unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string())
            .parse()
            .context("BIND_ADDR is not a valid socket address")?;

        let fetch_timeout_secs = match std::env::var("FETCH_TIMEOUT_SECS") {
            Ok(raw) => raw
                .parse()
                .context("FETCH_TIMEOUT_SECS is not a valid integer")?,
            Err(_) => DEFAULT_FETCH_TIMEOUT_SECS,
        };

        Ok(Self {
            database_url,
            bind_addr,
            fetch_timeout: Duration::from_secs(fetch_timeout_secs),
        })
    }
}
