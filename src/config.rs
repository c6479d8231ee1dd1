//! Relay configuration loaded from environment variables.
//!
//! The only environment setting is `PORT` (default `8080`). A `.env`
//! file is honoured via `dotenvy`. Log filtering is configured separately
//! through `RUST_LOG`.

use std::net::{Ipv4Addr, SocketAddr};

use crate::error::RelayError;

/// Port used when `PORT` is not set.
pub const DEFAULT_PORT: u16 = 8080;

/// Messages each connection may have queued for writing before further
/// payloads to it are dropped.
pub const DEFAULT_OUTBOUND_CAPACITY: usize = 1024;

/// Top-level relay configuration.
///
/// Loaded once at startup via [`RelayConfig::from_env`].
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Socket address to bind the server to (`0.0.0.0:<PORT>`).
    pub listen_addr: SocketAddr,

    /// Per-connection outbound channel capacity.
    pub outbound_capacity: usize,
}

impl RelayConfig {
    /// Loads configuration from the process environment.
    ///
    /// Calls `dotenvy::dotenv().ok()` to optionally load a `.env` file.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::InvalidConfig`] if `PORT` is set but is not a
    /// valid port number.
    pub fn from_env() -> Result<Self, RelayError> {
        dotenvy::dotenv().ok();
        let port = parse_port(std::env::var("PORT").ok().as_deref())?;
        Ok(Self::with_port(port))
    }

    /// Builds a configuration bound to all interfaces on `port`.
    #[must_use]
    pub fn with_port(port: u16) -> Self {
        Self {
            listen_addr: SocketAddr::from((Ipv4Addr::UNSPECIFIED, port)),
            outbound_capacity: DEFAULT_OUTBOUND_CAPACITY,
        }
    }
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self::with_port(DEFAULT_PORT)
    }
}

/// Parses the raw `PORT` value, falling back to [`DEFAULT_PORT`] when it
/// is unset or blank.
fn parse_port(raw: Option<&str>) -> Result<u16, RelayError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(DEFAULT_PORT),
        Some(value) => value
            .parse()
            .map_err(|_| RelayError::InvalidConfig(format!("PORT must be a port number, got {value:?}"))),
    }
}
