//! Core configuration types and loading.

use serde::Deserialize;
use std::net::SocketAddr;
use std::path::Path;
use thiserror::Error;

use super::anonymity::AnonymityConfig;
use super::limits::LimitsConfig;
use super::oper::OperBlock;
use super::validation::ValidationError;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {}", join_errors(.0))]
    Invalid(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// Server identity.
    #[serde(default)]
    pub server: ServerConfig,
    /// Client listener.
    #[serde(default)]
    pub listen: ListenConfig,
    /// Operator blocks.
    #[serde(default)]
    pub oper: Vec<OperBlock>,
    /// Ban persistence. Without it bans live in memory only.
    pub database: Option<DatabaseConfig>,
    /// Message of the Day configuration.
    #[serde(default)]
    pub motd: MotdConfig,
    /// Ban policy.
    #[serde(default)]
    pub bans: BansConfig,
    /// Queue, line and timeout limits.
    #[serde(default)]
    pub limits: LimitsConfig,
    /// Display identity settings.
    #[serde(default)]
    pub anonymity: AnonymityConfig,
}

impl Config {
    /// Load configuration from a TOML file, resolving the MOTD file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Config = toml::from_str(&content)?;
        config.motd.resolve();
        Ok(config)
    }

    /// Load and validate in one step.
    pub fn load_validated<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let config = Self::load(path)?;
        super::validation::validate(&config).map_err(ConfigError::Invalid)?;
        Ok(config)
    }
}

/// Server identity configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Name used as the prefix of server-originated messages.
    #[serde(default = "default_server_name")]
    pub name: String,
    /// Network name shown in the welcome line.
    #[serde(default = "default_server_name")]
    pub network: String,
    /// Free-form description.
    #[serde(default = "default_description")]
    pub description: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            name: default_server_name(),
            network: default_server_name(),
            description: default_description(),
        }
    }
}

fn default_server_name() -> String {
    "AnonIRC".to_string()
}

fn default_description() -> String {
    "Anonymous IRC".to_string()
}

/// Client listener configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ListenConfig {
    /// Address to bind, e.g. `0.0.0.0:6667`.
    #[serde(default = "default_listen_address")]
    pub address: SocketAddr,
}

impl Default for ListenConfig {
    fn default() -> Self {
        Self {
            address: default_listen_address(),
        }
    }
}

fn default_listen_address() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 6667))
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite file, or `:memory:`.
    pub path: String,
}

/// Ban policy configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct BansConfig {
    /// Admit connections when the ban store cannot be queried.
    #[serde(default)]
    pub fail_open: bool,
    /// Reason recorded when DLINE is given none.
    #[serde(default = "default_ban_reason")]
    pub default_reason: String,
    /// Minutes a DLINE lasts when no duration is given. 0 = permanent.
    #[serde(default)]
    pub default_duration: u64,
}

impl Default for BansConfig {
    fn default() -> Self {
        Self {
            fail_open: false,
            default_reason: default_ban_reason(),
            default_duration: 0,
        }
    }
}

fn default_ban_reason() -> String {
    "Banned".to_string()
}

const DEFAULT_MOTD: &str = r"
  _|_|                                  _|_|_|  _|_|_|      _|_|_|
_|    _|  _|_|_|      _|_|    _|_|_|      _|    _|    _|  _|
_|_|_|_|  _|    _|  _|    _|  _|    _|    _|    _|_|_|    _|
_|    _|  _|    _|  _|    _|  _|    _|    _|    _|    _|  _|
_|    _|  _|    _|    _|_|    _|    _|  _|_|_|  _|    _|    _|_|_|
";

/// Message of the Day (MOTD) configuration.
///
/// `lines` unset means the built-in banner; an explicit empty list
/// disables the MOTD (clients get ERR_NOMOTD).
#[derive(Debug, Clone, Deserialize, Default)]
pub struct MotdConfig {
    /// Path to MOTD file (one line per MOTD line).
    pub file: Option<String>,
    /// Inline MOTD lines (used when `file` is not set or unreadable).
    pub lines: Option<Vec<String>>,
}

impl MotdConfig {
    /// Read `file` into `lines`, so later reads never touch the disk.
    pub fn resolve(&mut self) {
        let Some(path) = self.file.as_deref() else {
            return;
        };
        match std::fs::read_to_string(path) {
            Ok(content) => {
                self.lines = Some(content.lines().map(str::to_string).collect());
            }
            Err(e) => {
                tracing::warn!(path = %path, error = %e, "Failed to read MOTD file");
            }
        }
    }

    /// Lines to send between RPL_MOTDSTART and RPL_ENDOFMOTD.
    pub fn lines(&self) -> Vec<String> {
        match &self.lines {
            Some(lines) => lines.clone(),
            None => DEFAULT_MOTD
                .lines()
                .filter(|l| !l.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }
}
