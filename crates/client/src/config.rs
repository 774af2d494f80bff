//! Client configuration.
//!
//! Configuration is stored as TOML:
//! - Linux: `~/.config/crypstore/client.toml`
//! - Windows: `%APPDATA%/crypstore/client.toml`

use std::path::{Path, PathBuf};
use std::time::Duration;

use rustls_pki_types::CertificateDer;
use rustls_pki_types::pem::PemObject;
use serde::{Deserialize, Serialize};

use crypstore_protocol::constants::DEFAULT_PORT;

/// Errors loading or saving configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("cannot serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("no server certificate configured")]
    MissingCertificate,

    #[error("invalid server certificate {path}: {reason}")]
    Certificate { path: PathBuf, reason: String },

    #[error("TLS setup failed: {0}")]
    Tls(#[from] rustls::Error),

    #[error("no server endpoint configured")]
    NoEndpoint,

    #[error("{0} must be greater than zero")]
    ZeroTimeout(&'static str),
}

/// Connection settings for the store client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Host name or IP address of the store server.
    #[serde(default = "default_address")]
    pub server_address: String,

    #[serde(default = "default_port")]
    pub server_port: u16,

    /// PEM or DER file holding the server certificate whose public key is pinned.
    #[serde(default)]
    pub server_certificate: PathBuf,

    #[serde(default = "default_timeout_secs")]
    pub connect_timeout_secs: u64,

    #[serde(default = "default_timeout_secs")]
    pub read_timeout_secs: u64,

    #[serde(default = "default_timeout_secs")]
    pub write_timeout_secs: u64,
}

fn default_address() -> String {
    "localhost".into()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_address: default_address(),
            server_port: default_port(),
            server_certificate: PathBuf::new(),
            connect_timeout_secs: default_timeout_secs(),
            read_timeout_secs: default_timeout_secs(),
            write_timeout_secs: default_timeout_secs(),
        }
    }
}

/// Per-operation I/O deadlines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub connect: Duration,
    pub read: Duration,
    pub write: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        let secs = Duration::from_secs(default_timeout_secs());
        Self {
            connect: secs,
            read: secs,
            write: secs,
        }
    }
}

impl ClientConfig {
    /// Parses configuration from a TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects settings that parse but cannot work. A zero timeout would
    /// fail every connect, read or write at once.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, secs) in [
            ("connect_timeout_secs", self.connect_timeout_secs),
            ("read_timeout_secs", self.read_timeout_secs),
            ("write_timeout_secs", self.write_timeout_secs),
        ] {
            if secs == 0 {
                return Err(ConfigError::ZeroTimeout(name));
            }
        }
        Ok(())
    }

    /// Loads configuration from `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&content)?;
        tracing::debug!(path = %path.display(), "configuration loaded");
        Ok(config)
    }

    /// Writes configuration to `path`, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let io_err = |source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(io_err)?;

        tracing::debug!(path = %path.display(), "configuration saved");
        Ok(())
    }

    pub fn timeouts(&self) -> Timeouts {
        Timeouts {
            connect: Duration::from_secs(self.connect_timeout_secs),
            read: Duration::from_secs(self.read_timeout_secs),
            write: Duration::from_secs(self.write_timeout_secs),
        }
    }

    /// Reads the pinned server certificate (PEM or DER).
    pub fn load_server_certificate(&self) -> Result<CertificateDer<'static>, ConfigError> {
        if self.server_certificate.as_os_str().is_empty() {
            return Err(ConfigError::MissingCertificate);
        }
        let path = &self.server_certificate;
        let bytes = std::fs::read(path).map_err(|source| ConfigError::Io {
            path: path.clone(),
            source,
        })?;
        parse_certificate(&bytes).map_err(|reason| ConfigError::Certificate {
            path: path.clone(),
            reason,
        })
    }
}

/// Accepts the first certificate of a PEM file or a raw DER certificate.
fn parse_certificate(bytes: &[u8]) -> Result<CertificateDer<'static>, String> {
    if bytes.starts_with(b"-----BEGIN") {
        CertificateDer::from_pem_slice(bytes).map_err(|e| e.to_string())
    } else if bytes.is_empty() {
        Err("file is empty".into())
    } else {
        Ok(CertificateDer::from(bytes.to_vec()))
    }
}

/// Returns the platform-specific configuration file path.
pub fn default_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        let appdata =
            std::env::var("APPDATA").unwrap_or_else(|_| "C:\\Users\\Default\\AppData".into());
        PathBuf::from(appdata).join("crypstore").join("client.toml")
    }

    #[cfg(not(target_os = "windows"))]
    {
        let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".into());
        PathBuf::from(home)
            .join(".config")
            .join("crypstore")
            .join("client.toml")
    }
}
