//! printwatch-core — shared types for the printer liveness monitor.
//!
//! Holds the device roster (the fixed list of monitored printers) and
//! the `printwatch.toml` configuration parser. Nothing here performs
//! network I/O.

pub mod config;
pub mod duration;
pub mod roster;

pub use config::{ConfigError, MonitorConfig, PrintwatchConfig, ProbeMethod, ServerConfig};
pub use duration::parse_duration;
pub use roster::{Device, Roster};
