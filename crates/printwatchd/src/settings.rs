//! Effective runtime settings: printwatch.toml merged with CLI flags.

use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use tracing::info;

use printwatch_core::{PrintwatchConfig, ProbeMethod, Roster};

/// Settings resolved once at startup. Never changed afterwards.
#[derive(Debug, Clone)]
pub struct Settings {
    pub roster: Roster,
    pub interval: Duration,
    pub timeout: Duration,
    pub method: ProbeMethod,
    pub tcp_port: u16,
    pub bind: SocketAddr,
}

impl Settings {
    /// Read the config file (defaults when it is missing) and apply
    /// overrides. An unreadable or invalid file is an error.
    pub fn load(
        path: &Path,
        timeout: Option<Duration>,
        method: Option<ProbeMethod>,
    ) -> anyhow::Result<Self> {
        let (config, found) = PrintwatchConfig::load_or_default(path)?;
        if found {
            info!(path = %path.display(), "configuration loaded");
        } else {
            info!(path = %path.display(), "no configuration file, using defaults");
        }

        let mut settings = Self::from_config(&config)?;
        if let Some(timeout) = timeout {
            settings.timeout = timeout;
        }
        if let Some(method) = method {
            settings.method = method;
        }
        Ok(settings)
    }

    pub fn from_config(config: &PrintwatchConfig) -> anyhow::Result<Self> {
        Ok(Self {
            roster: config.roster(),
            interval: config.monitor.interval()?,
            timeout: config.monitor.timeout()?,
            method: config.monitor.method,
            tcp_port: config.monitor.tcp_port,
            bind: config.server.bind,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_without_file() {
        let settings = Settings::load(Path::new("/nonexistent/printwatch.toml"), None, None).unwrap();
        assert_eq!(settings.interval, Duration::from_secs(30));
        assert_eq!(settings.timeout, Duration::from_secs(3));
        assert_eq!(settings.method, ProbeMethod::Icmp);
        assert_eq!(settings.roster.len(), 27);
    }

    #[test]
    fn overrides_win() {
        let settings = Settings::load(
            Path::new("/nonexistent/printwatch.toml"),
            Some(Duration::from_millis(750)),
            Some(ProbeMethod::Tcp),
        )
        .unwrap();
        assert_eq!(settings.timeout, Duration::from_millis(750));
        assert_eq!(settings.method, ProbeMethod::Tcp);
    }

    #[test]
    fn from_config_uses_listed_printers() {
        let config = PrintwatchConfig::from_toml_str(
            r#"
[monitor]
interval = "10s"
tcp_port = 9100

[[printers]]
id = "PHARI001"
address = "10.10.64.4"
location = "LABORATORIO"
"#,
        )
        .unwrap();
        let settings = Settings::from_config(&config).unwrap();
        assert_eq!(settings.interval, Duration::from_secs(10));
        assert_eq!(settings.tcp_port, 9100);
        assert_eq!(settings.roster.len(), 1);
    }
}
