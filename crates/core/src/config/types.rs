use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;

use crate::gate::DEFAULT_GATES;

/// Root configuration. Every section is optional.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub dispatch: DispatchConfig,
    #[serde(default)]
    pub gates: GatesConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}

fn default_port() -> u16 {
    3008
}

/// Database configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("valet.db")
}

/// Dispatch engine configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DispatchConfig {
    /// A gate must score strictly above this to be dispatched (0-98).
    #[serde(default = "default_confidence_threshold")]
    pub confidence_threshold: u8,

    /// Which gate scorer to use.
    #[serde(default)]
    pub scorer: ScorerKind,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: default_confidence_threshold(),
            scorer: ScorerKind::default(),
        }
    }
}

fn default_confidence_threshold() -> u8 {
    90
}

/// Available gate scorers
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ScorerKind {
    /// Deterministic RSSI-based scoring.
    #[default]
    Signal,
    /// Uniform random scores.
    Random,
}

/// Gate registry configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GatesConfig {
    /// Seeded into an empty registry at startup, in this order.
    #[serde(default = "default_gates")]
    pub defaults: Vec<String>,
}

impl Default for GatesConfig {
    fn default() -> Self {
        Self {
            defaults: default_gates(),
        }
    }
}

fn default_gates() -> Vec<String> {
    DEFAULT_GATES.iter().map(|g| g.to_string()).collect()
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// `EnvFilter` directive, used when `RUST_LOG` is unset.
    #[serde(default = "default_log_filter")]
    pub filter: String,
    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
            json: false,
        }
    }
}

fn default_log_filter() -> String {
    "info,tower_http=debug".to_string()
}
