//! Configuration loading and management.

use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::Duration;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

use reps_core::detector::{
    DEFAULT_MIN_REP_INTERVAL_MS, DEFAULT_RETURN_ANGLE_DEG, DEFAULT_SQUAT_ANGLE_DEG,
};
use reps_core::{ConfigError, DetectorConfig, Goal};

/// Smallest daily goal the configuration accepts.
pub const GOAL_MIN: u32 = 1;

/// Largest daily goal the configuration accepts.
pub const GOAL_MAX: u32 = 200;

const DEFAULT_DAILY_GOAL: u32 = 30;

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to the database file.
    pub database_path: PathBuf,
    /// Path the snapshot payload is written to.
    pub snapshot_path: PathBuf,
    /// Daily repetition goal.
    pub daily_goal: u32,
    /// Tilt angle in degrees past which a squat starts.
    pub squat_angle_deg: f64,
    /// Tilt angle in degrees under which the body counts as upright again.
    pub return_angle_deg: f64,
    /// Minimum milliseconds between two counted repetitions.
    pub min_rep_interval_ms: i64,
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs_data_path().unwrap_or_else(|| PathBuf::from("."));
        Self {
            database_path: data_dir.join("reps.db"),
            snapshot_path: data_dir.join("snapshot.json"),
            daily_goal: DEFAULT_DAILY_GOAL,
            squat_angle_deg: DEFAULT_SQUAT_ANGLE_DEG,
            return_angle_deg: DEFAULT_RETURN_ANGLE_DEG,
            min_rep_interval_ms: DEFAULT_MIN_REP_INTERVAL_MS,
        }
    }
}

impl Config {
    /// Loads configuration from default locations.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load() -> Result<Self, figment::Error> {
        Self::load_from(None)
    }

    /// Loads configuration, optionally from a specific file.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Load from default config location
        if let Some(path) = default_config_file() {
            figment = figment.merge(Toml::file(path));
        }

        // Load from specified config file
        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // Load from environment variables (REPS_*)
        figment = figment.merge(Env::prefixed("REPS_"));

        figment.extract()
    }

    /// The configured daily goal, validated against the accepted bounds.
    pub fn goal(&self) -> Result<Goal> {
        validate_goal(self.daily_goal)
    }

    /// The configured detector thresholds, validated.
    pub fn detector_config(&self) -> Result<DetectorConfig, ConfigError> {
        let config = DetectorConfig {
            squat_angle_deg: self.squat_angle_deg,
            return_angle_deg: self.return_angle_deg,
            min_rep_interval: Duration::milliseconds(self.min_rep_interval_ms),
        };
        config.validate()?;
        Ok(config)
    }
}

/// Validates a daily goal against the accepted bounds.
pub fn validate_goal(reps: u32) -> Result<Goal> {
    anyhow::ensure!(
        (GOAL_MIN..=GOAL_MAX).contains(&reps),
        "daily goal must be between {GOAL_MIN} and {GOAL_MAX}, got {reps}"
    );
    Goal::new(reps).map_err(Into::into)
}

/// Returns the platform-specific config directory for reps.
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("reps"))
}

/// Returns the platform-specific data directory for reps.
///
/// On Linux: `~/.local/share/reps`
pub fn dirs_data_path() -> Option<PathBuf> {
    dirs::data_dir().map(|p| p.join("reps"))
}

/// Returns the default config file location.
///
/// On Linux: `~/.config/reps/config.toml`
pub fn default_config_file() -> Option<PathBuf> {
    dirs_config_path().map(|p| p.join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dirs_data_path_returns_some() {
        assert!(dirs_data_path().is_some());
    }

    #[test]
    fn test_dirs_data_path_ends_with_reps() {
        let path = dirs_data_path().unwrap();
        assert_eq!(path.file_name().unwrap(), "reps");
    }

    #[test]
    fn test_default_config_file_is_under_config_dir() {
        let path = default_config_file().unwrap();
        assert_eq!(path.file_name().unwrap(), "config.toml");
        assert_eq!(path.parent().unwrap().file_name().unwrap(), "reps");
    }

    #[test]
    fn test_default_config_uses_data_dir() {
        let config = Config::default();
        let data_dir = dirs_data_path().unwrap();
        assert_eq!(config.database_path, data_dir.join("reps.db"));
        assert_eq!(config.snapshot_path, data_dir.join("snapshot.json"));
    }

    #[test]
    fn test_default_goal_is_accepted() {
        let config = Config::default();
        assert_eq!(config.goal().unwrap().get(), 30);
    }

    #[test]
    fn test_goal_bounds_are_enforced() {
        assert!(validate_goal(0).is_err());
        assert!(validate_goal(201).is_err());
        assert!(validate_goal(1).is_ok());
        assert!(validate_goal(200).is_ok());
    }

    #[test]
    fn test_default_detector_config_is_valid() {
        let config = Config::default();
        let detector = config.detector_config().unwrap();
        assert!((detector.squat_angle_deg - 45.0).abs() < f64::EPSILON);
        assert!((detector.return_angle_deg - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_inverted_thresholds_are_rejected() {
        let config = Config {
            squat_angle_deg: 10.0,
            return_angle_deg: 45.0,
            ..Config::default()
        };
        assert!(config.detector_config().is_err());
    }
}
