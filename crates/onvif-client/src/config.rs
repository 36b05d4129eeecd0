//! TOML-based client configuration.
//!
//! A library crate does not own a platform config directory; the caller
//! passes the path.  Every field has a serde default so a missing file, or
//! an older file missing newer fields, still yields a working configuration.
//!
//! ```toml
//! [transport]
//! timeout_secs = 10
//!
//! [discovery]
//! bind_addr = "0.0.0.0:0"
//! multicast_addr = "239.255.255.250:3702"
//! response_window_secs = 3
//! ```

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::discovery::DiscoveryConfig;
use crate::transport::{HttpTransport, TransportError};

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A file system I/O error occurred.
    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// The config could not be serialized to TOML.
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Top-level client configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ClientConfig {
    #[serde(default)]
    pub transport: TransportSettings,
    #[serde(default)]
    pub discovery: DiscoverySettings,
}

/// HTTP transport settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TransportSettings {
    /// Per-request timeout in seconds.  The session layer imposes no
    /// timeouts of its own; this is the transport boundary.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Discovery socket settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DiscoverySettings {
    /// Local address to bind the probe socket on.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: SocketAddr,
    /// WS-Discovery multicast destination.
    #[serde(default = "default_multicast_addr")]
    pub multicast_addr: SocketAddr,
    /// Announcement collection window in seconds.
    #[serde(default = "default_response_window_secs")]
    pub response_window_secs: u64,
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_bind_addr() -> SocketAddr {
    "0.0.0.0:0".parse().expect("static addr")
}

fn default_multicast_addr() -> SocketAddr {
    "239.255.255.250:3702".parse().expect("static addr")
}

fn default_response_window_secs() -> u64 {
    3
}

impl Default for TransportSettings {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for DiscoverySettings {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            multicast_addr: default_multicast_addr(),
            response_window_secs: default_response_window_secs(),
        }
    }
}

impl ClientConfig {
    /// Loads the configuration from `path`, returning defaults if the file
    /// does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] on I/O failure or unparsable TOML.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            info!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(toml::from_str(&text)?)
    }

    /// Writes the configuration to `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] on I/O or serialization failure.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let text = toml::to_string_pretty(self)?;
        std::fs::write(path, text).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Builds the HTTP transport described by this configuration.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Client`] if the HTTP client cannot be
    /// constructed.
    pub fn http_transport(&self) -> Result<HttpTransport, TransportError> {
        HttpTransport::new(Duration::from_secs(self.transport.timeout_secs))
    }

    /// Builds the discovery parameters described by this configuration.
    /// The transport timeout carries over, so sessions constructed from
    /// discovered candidates honour it too.
    pub fn discovery_config(&self) -> DiscoveryConfig {
        DiscoveryConfig {
            bind_addr: self.discovery.bind_addr,
            multicast_addr: self.discovery.multicast_addr,
            response_window: Duration::from_secs(self.discovery.response_window_secs),
            session_timeout: Duration::from_secs(self.transport.timeout_secs),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_apply_for_empty_toml() {
        let config: ClientConfig = toml::from_str("").unwrap();
        assert_eq!(config, ClientConfig::default());
        assert_eq!(config.transport.timeout_secs, 10);
        assert_eq!(
            config.discovery.multicast_addr,
            "239.255.255.250:3702".parse::<SocketAddr>().unwrap()
        );
    }

    #[test]
    fn test_partial_file_fills_missing_fields() {
        let config: ClientConfig = toml::from_str("[transport]\ntimeout_secs = 30\n").unwrap();
        assert_eq!(config.transport.timeout_secs, 30);
        assert_eq!(config.discovery.response_window_secs, 3);
    }

    #[test]
    fn test_round_trip_preserves_values() {
        let mut config = ClientConfig::default();
        config.transport.timeout_secs = 42;
        let text = toml::to_string_pretty(&config).unwrap();
        let parsed: ClientConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_transport_timeout_carries_into_discovery_sessions() {
        let mut config = ClientConfig::default();
        config.transport.timeout_secs = 42;
        let discovery = config.discovery_config();
        assert_eq!(discovery.session_timeout, Duration::from_secs(42));
        assert!(config.http_transport().is_ok());
    }

    #[test]
    fn test_missing_file_loads_defaults() {
        let config = ClientConfig::load(Path::new("/nonexistent/onvif-client.toml")).unwrap();
        assert_eq!(config, ClientConfig::default());
    }
}
