//! TOML-based application configuration.
//!
//! Stores the scheduling preferences the engine is parameterized with:
//! - IANA timezone all wall-clock hours are interpreted in
//! - Default per-weekday awake-hours
//! - Scheduler knobs (search horizon, displacement bound)
//!
//! Configuration is stored at `~/.config/slotwise/config.toml`. The
//! timezone string is parsed and the hours validated exactly once, when the
//! config is turned into an [`Availability`]; the engine itself never
//! re-validates.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::availability::{Availability, HourRange, WeekHours};
use crate::error::ConfigError;
use crate::scheduler::SchedulerConfig;

/// Scheduler tuning knobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulingConfig {
    #[serde(default = "default_search_horizon_days")]
    pub search_horizon_days: i64,
    #[serde(default = "default_max_displacements")]
    pub max_displacements: usize,
    #[serde(default = "default_max_horizon_extensions")]
    pub max_horizon_extensions: u32,
}

impl Default for SchedulingConfig {
    fn default() -> Self {
        Self {
            search_horizon_days: default_search_horizon_days(),
            max_displacements: default_max_displacements(),
            max_horizon_extensions: default_max_horizon_extensions(),
        }
    }
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/slotwise/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// IANA timezone name, e.g. "America/Chicago"
    #[serde(default = "default_timezone")]
    pub timezone: String,
    /// Default awake-hours when a task's group imposes no window
    #[serde(default = "default_awake_hours")]
    pub awake_hours: WeekHours,
    #[serde(default)]
    pub scheduling: SchedulingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            timezone: default_timezone(),
            awake_hours: default_awake_hours(),
            scheduling: SchedulingConfig::default(),
        }
    }
}

fn default_timezone() -> String {
    "UTC".to_string()
}

fn default_awake_hours() -> WeekHours {
    WeekHours::uniform(HourRange::new(8, 22))
}

fn default_search_horizon_days() -> i64 {
    7
}

fn default_max_displacements() -> usize {
    16
}

fn default_max_horizon_extensions() -> u32 {
    3
}

impl Config {
    /// Path of the configuration file.
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("slotwise")
            .join("config.toml")
    }

    /// Load the configuration, falling back to defaults when the file is
    /// missing or unreadable.
    pub fn load_or_default() -> Self {
        Self::load_from(&Self::config_path()).unwrap_or_default()
    }

    /// Load the configuration from an explicit path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::LoadFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        toml::from_str(&raw).map_err(|e| ConfigError::ParseFailed(e.to_string()))
    }

    /// Save the configuration to the default path.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::config_path())
    }

    /// Save the configuration to an explicit path.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let raw = toml::to_string_pretty(self).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::SaveFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
        }
        std::fs::write(path, raw).map_err(|e| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Build the validated [`Availability`] the engine consumes.
    ///
    /// Parses the timezone and validates the hour ranges; this is the one
    /// boundary where loosely-typed configuration becomes typed input.
    pub fn availability(&self) -> Result<Availability, ConfigError> {
        let timezone = self
            .timezone
            .parse()
            .map_err(|_| ConfigError::InvalidValue {
                key: "timezone".to_string(),
                message: format!("'{}' is not a known IANA timezone", self.timezone),
            })?;
        self.awake_hours
            .validate()
            .map_err(|e| ConfigError::InvalidValue {
                key: "awake_hours".to_string(),
                message: e.to_string(),
            })?;
        Ok(Availability::new(timezone, self.awake_hours.clone()))
    }

    /// The scheduler configuration this config describes.
    pub fn scheduler_config(&self) -> SchedulerConfig {
        SchedulerConfig {
            search_horizon_days: self.scheduling.search_horizon_days.max(1),
            max_displacements: self.scheduling.max_displacements,
            max_horizon_extensions: self.scheduling.max_horizon_extensions,
        }
    }
}
