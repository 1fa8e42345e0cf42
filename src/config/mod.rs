//! Configuration loading and validation.

use chrono::{Duration, FixedOffset};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::calculate::EventWindows;
use crate::models::{Roster, RosterError};

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid roster: {0}")]
    RosterError(#[from] RosterError),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Team membership.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamsConfig {
    #[serde(default = "default_core")]
    pub core: Vec<String>,

    #[serde(default = "default_sweep")]
    pub sweep: Vec<String>,
}

fn default_core() -> Vec<String> {
    Roster::default().members(crate::models::TeamName::Core).to_vec()
}

fn default_sweep() -> Vec<String> {
    Roster::default().members(crate::models::TeamName::Sweep).to_vec()
}

impl Default for TeamsConfig {
    fn default() -> Self {
        Self {
            core: default_core(),
            sweep: default_sweep(),
        }
    }
}

/// Board behaviour.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardConfig {
    /// How long the new-sale banner shows
    #[serde(default = "default_celebration_secs")]
    pub celebration_secs: u64,

    /// How long a newly added row stays highlighted
    #[serde(default = "default_highlight_secs")]
    pub highlight_secs: u64,

    /// How often the file feed checks for changes
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Offset from UTC used to decide what "today" is.
    /// Unset means the system's local time zone.
    #[serde(default)]
    pub utc_offset_minutes: Option<i32>,
}

fn default_celebration_secs() -> u64 {
    3
}

fn default_highlight_secs() -> u64 {
    5
}

fn default_poll_interval_ms() -> u64 {
    1000
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            celebration_secs: default_celebration_secs(),
            highlight_secs: default_highlight_secs(),
            poll_interval_ms: default_poll_interval_ms(),
            utc_offset_minutes: None,
        }
    }
}

impl BoardConfig {
    pub fn event_windows(&self) -> EventWindows {
        EventWindows {
            celebration: Duration::seconds(self.celebration_secs as i64),
            highlight: Duration::seconds(self.highlight_secs as i64),
        }
    }

    pub fn poll_interval(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.poll_interval_ms)
    }

    pub fn utc_offset(&self) -> Option<FixedOffset> {
        self.utc_offset_minutes
            .and_then(|minutes| FixedOffset::east_opt(minutes * 60))
    }
}

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_cors_origin")]
    pub cors_origin: String,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_cors_origin() -> String {
    "*".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origin: default_cors_origin(),
        }
    }
}

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub teams: TeamsConfig,

    #[serde(default)]
    pub board: BoardConfig,

    #[serde(default)]
    pub server: ServerConfig,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            log_level: default_log_level(),
            teams: TeamsConfig::default(),
            board: BoardConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path` if it exists, otherwise use defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    /// The validated team roster.
    pub fn roster(&self) -> Result<Roster, ConfigError> {
        Ok(Roster::new(self.teams.core.clone(), self.teams.sweep.clone())?)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.roster()?;

        if self.board.celebration_secs == 0 || self.board.highlight_secs == 0 {
            return Err(ConfigError::ValidationError(
                "Event windows must be greater than 0".to_string(),
            ));
        }

        if self.board.poll_interval_ms == 0 {
            return Err(ConfigError::ValidationError(
                "Poll interval must be greater than 0".to_string(),
            ));
        }

        if let Some(minutes) = self.board.utc_offset_minutes {
            if minutes.abs() > 14 * 60 {
                return Err(ConfigError::ValidationError(format!(
                    "UTC offset out of range: {} minutes",
                    minutes
                )));
            }
        }

        if self.server.port == 0 {
            return Err(ConfigError::ValidationError(
                "Server port must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}
