//! printwatch.toml configuration parser.
//!
//! ```toml
//! [monitor]
//! interval = "30s"
//! timeout = "3s"
//! method = "icmp"
//!
//! [server]
//! bind = "0.0.0.0:8080"
//!
//! [[printers]]
//! id = "PHARI064"
//! address = "10.10.64.30"
//! location = "SISTEMAS"
//! ```
//!
//! Every section is optional. With no `[[printers]]` the built-in roster
//! is used.

use std::fmt;
use std::net::SocketAddr;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::duration::parse_duration;
use crate::roster::{Device, Roster};

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid duration for {field}: {value:?}")]
    Duration { field: &'static str, value: String },

    #[error("unknown probe method: {0:?} (expected \"icmp\" or \"tcp\")")]
    Method(String),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PrintwatchConfig {
    pub monitor: MonitorConfig,
    pub server: ServerConfig,
    pub printers: Vec<Device>,
}

/// Sweep cadence and probe settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    pub interval: String,
    pub timeout: String,
    pub method: ProbeMethod,
    /// Port used by the TCP connect probe.
    pub tcp_port: u16,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            interval: "30s".to_string(),
            timeout: "3s".to_string(),
            method: ProbeMethod::Icmp,
            tcp_port: 80,
        }
    }
}

impl MonitorConfig {
    pub fn interval(&self) -> Result<Duration, ConfigError> {
        non_zero("monitor.interval", &self.interval)
    }

    pub fn timeout(&self) -> Result<Duration, ConfigError> {
        non_zero("monitor.timeout", &self.timeout)
    }
}

fn non_zero(field: &'static str, value: &str) -> Result<Duration, ConfigError> {
    match parse_duration(value) {
        Some(d) if !d.is_zero() => Ok(d),
        _ => Err(ConfigError::Duration {
            field,
            value: value.to_string(),
        }),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([0, 0, 0, 0], 8080)),
        }
    }
}

/// How reachability is checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProbeMethod {
    /// One ICMP echo via the system `ping` utility.
    #[default]
    Icmp,
    /// TCP connect to `monitor.tcp_port`.
    Tcp,
}

impl FromStr for ProbeMethod {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "icmp" | "ping" => Ok(Self::Icmp),
            "tcp" => Ok(Self::Tcp),
            _ => Err(ConfigError::Method(s.to_string())),
        }
    }
}

impl fmt::Display for ProbeMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Icmp => f.write_str("icmp"),
            Self::Tcp => f.write_str("tcp"),
        }
    }
}

impl PrintwatchConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: PrintwatchConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load `path` if it exists, otherwise fall back to defaults.
    ///
    /// Returns the config and whether the file was found.
    pub fn load_or_default(path: &Path) -> Result<(Self, bool), ConfigError> {
        if path.exists() {
            Ok((Self::from_file(path)?, true))
        } else {
            Ok((Self::default(), false))
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.monitor.interval()?;
        self.monitor.timeout()?;
        Ok(())
    }

    /// The configured roster, or the built-in one when none is listed.
    pub fn roster(&self) -> Roster {
        if self.printers.is_empty() {
            Roster::builtin()
        } else {
            Roster::new(self.printers.clone())
        }
    }
}
