// src/config.rs

//! Runtime configuration for the Packman server

use crate::error::{Error, Result};
use std::net::{SocketAddr, ToSocketAddrs};

/// Default address the server listens on
pub const DEFAULT_LISTEN: &str = "0.0.0.0:8080";

/// Default cap on a single request line, terminator included
pub const DEFAULT_MAX_LINE_BYTES: usize = 1024 * 1024;

/// Server settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub listen: SocketAddr,
    /// Longer lines are answered with `ERROR` and skipped
    pub max_line_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: SocketAddr::from(([0, 0, 0, 0], 8080)),
            max_line_bytes: DEFAULT_MAX_LINE_BYTES,
        }
    }
}

impl ServerConfig {
    /// Build a config from a `host:port` string
    ///
    /// Host names are resolved and the first address is used.
    pub fn from_listen(listen: &str) -> Result<Self> {
        let listen = listen
            .to_socket_addrs()
            .map_err(|e| {
                Error::Io(std::io::Error::new(
                    e.kind(),
                    format!("Invalid listen address '{}': {}", listen, e),
                ))
            })?
            .next()
            .ok_or_else(|| {
                Error::Io(std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    format!("Listen address '{}' resolved to nothing", listen),
                ))
            })?;

        Ok(Self {
            listen,
            ..Self::default()
        })
    }

    /// Override the request line cap
    pub fn with_max_line_bytes(mut self, max_line_bytes: usize) -> Result<Self> {
        if max_line_bytes == 0 {
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "Maximum line length must be greater than zero",
            )));
        }
        self.max_line_bytes = max_line_bytes;
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_matches_constant() {
        let config = ServerConfig::default();
        assert_eq!(config.listen, DEFAULT_LISTEN.parse::<SocketAddr>().unwrap());
    }

    #[test]
    fn test_from_listen() {
        let config = ServerConfig::from_listen("127.0.0.1:9000").unwrap();
        assert_eq!(config.listen.port(), 9000);
        assert!(config.listen.ip().is_loopback());
    }

    #[test]
    fn test_max_line_bytes() {
        let config = ServerConfig::from_listen("127.0.0.1:0").unwrap();
        assert_eq!(config.max_line_bytes, DEFAULT_MAX_LINE_BYTES);

        let config = config.with_max_line_bytes(64).unwrap();
        assert_eq!(config.max_line_bytes, 64);
        assert!(config.with_max_line_bytes(0).is_err());
    }

    #[test]
    fn test_from_listen_rejects_garbage() {
        assert!(ServerConfig::from_listen("not an address").is_err());
        assert!(ServerConfig::from_listen("127.0.0.1").is_err());
    }
}
