//! Scheduling configuration loading from scheduling.toml
//!
//! Opening times, undo history depth and clinic-specific holidays are read from a
//! TOML file. Every field has a default, so an empty file yields the standard clinic
//! policy (09:00 on weekends and holidays, 17:00 on weekdays).

use crate::errors::{Error, Result};
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Deserializer};
use std::path::Path;

/// Configuration structure representing the entire scheduling.toml file
#[derive(Debug, Clone, Deserialize)]
pub struct SchedulingConfig {
    /// First slot of the day on ordinary weekdays
    #[serde(default = "default_weekday_opening", deserialize_with = "hh_mm")]
    pub weekday_opening: NaiveTime,
    /// First slot of the day on weekends and holidays
    #[serde(default = "default_holiday_opening", deserialize_with = "hh_mm")]
    pub holiday_opening: NaiveTime,
    /// Number of booking-list snapshots kept for undo/redo
    #[serde(default = "default_history_capacity")]
    pub history_capacity: usize,
    /// Clinic-specific holidays on top of the national table
    #[serde(default)]
    pub holidays: Vec<CustomHoliday>,
}

/// A holiday added by the clinic.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CustomHoliday {
    /// Date of the holiday; only month and day matter when `recurring` is set
    pub date: NaiveDate,
    /// Display name
    pub name: String,
    /// Repeat every year on the same month/day
    #[serde(default)]
    pub recurring: bool,
}

impl Default for SchedulingConfig {
    fn default() -> Self {
        Self {
            weekday_opening: default_weekday_opening(),
            holiday_opening: default_holiday_opening(),
            history_capacity: default_history_capacity(),
            holidays: Vec::new(),
        }
    }
}

fn default_weekday_opening() -> NaiveTime {
    NaiveTime::from_hms_opt(17, 0, 0).unwrap_or(NaiveTime::MIN)
}

fn default_holiday_opening() -> NaiveTime {
    NaiveTime::from_hms_opt(9, 0, 0).unwrap_or(NaiveTime::MIN)
}

const fn default_history_capacity() -> usize {
    50
}

fn hh_mm<'de, D>(deserializer: D) -> std::result::Result<NaiveTime, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    NaiveTime::parse_from_str(raw.trim(), "%H:%M").map_err(serde::de::Error::custom)
}

/// Parses scheduling configuration from a TOML string.
///
/// # Errors
/// Returns [`Error::Config`] if the TOML is invalid or a value is out of range.
pub fn parse_config(contents: &str) -> Result<SchedulingConfig> {
    let config: SchedulingConfig = toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse scheduling config: {e}"),
    })?;

    if config.history_capacity == 0 {
        return Err(Error::Config {
            message: "history_capacity must be at least 1".to_string(),
        });
    }

    Ok(config)
}

/// Loads scheduling configuration from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
/// - An opening time is not in `HH:MM` form
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<SchedulingConfig> {
    let path_ref = path.as_ref();
    tracing::debug!("Loading scheduling configuration from {:?}", path_ref);
    let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
        message: format!("Failed to read config file {}: {e}", path_ref.display()),
    })?;

    parse_config(&contents)
}

/// Loads scheduling configuration from `SCHEDULING_CONFIG`, falling back to
/// `./scheduling.toml`, and to built-in defaults when that file does not exist.
pub fn load_default_config() -> Result<SchedulingConfig> {
    let path =
        std::env::var("SCHEDULING_CONFIG").unwrap_or_else(|_| "scheduling.toml".to_string());
    if Path::new(&path).exists() {
        load_config(path)
    } else {
        tracing::info!("No scheduling config at {path}, using defaults");
        Ok(SchedulingConfig::default())
    }
}
