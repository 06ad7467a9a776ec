// config.rs — Engine tuning, loaded from the `[engine]` table of config.toml.
//
// Every field has a serde default, so an empty or missing file yields the
// stock behaviour: a 5-run trailing window, +10% distance, 3% faster pace,
// four weeks to reach the goal, and a 10-second notification.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Parameters for target computation and notification display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// How many of the most recent completed runs feed the targets.
    #[serde(default = "default_window_size")]
    pub window_size: usize,

    /// Fewer completed runs than this means "not enough data".
    #[serde(default = "default_min_runs")]
    pub min_runs: usize,

    /// Fractional distance increase over the reference distance (0.10 = +10%).
    #[serde(default = "default_distance_increase")]
    pub distance_increase: f64,

    /// Fractional pace improvement over the reference pace (0.03 = 3% faster).
    #[serde(default = "default_pace_improvement")]
    pub pace_improvement: f64,

    /// Days from computation until the goal's target date.
    #[serde(default = "default_target_horizon_days")]
    pub target_horizon_days: u32,

    /// How long a goal-created notification stays visible.
    #[serde(default = "default_notification_visible_secs")]
    pub notification_visible_secs: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            window_size: default_window_size(),
            min_runs: default_min_runs(),
            distance_increase: default_distance_increase(),
            pace_improvement: default_pace_improvement(),
            target_horizon_days: default_target_horizon_days(),
            notification_visible_secs: default_notification_visible_secs(),
        }
    }
}

// Serde default functions
fn default_window_size() -> usize {
    5
}

fn default_min_runs() -> usize {
    1
}

fn default_distance_increase() -> f64 {
    0.10
}

fn default_pace_improvement() -> f64 {
    0.03
}

fn default_target_horizon_days() -> u32 {
    28
}

fn default_notification_visible_secs() -> u64 {
    10
}

/// Shape of config.toml. Other tables are ignored.
#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    engine: EngineConfig,
}

impl EngineConfig {
    /// Reject values that would break the target contract.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.window_size == 0 {
            return Err(EngineError::InvalidConfig("window_size must be at least 1".into()));
        }
        if self.min_runs == 0 {
            return Err(EngineError::InvalidConfig("min_runs must be at least 1".into()));
        }
        if !(0.0..1.0).contains(&self.distance_increase) {
            return Err(EngineError::InvalidConfig(format!(
                "distance_increase must be in [0, 1), got {}",
                self.distance_increase
            )));
        }
        if !(0.0..1.0).contains(&self.pace_improvement) {
            return Err(EngineError::InvalidConfig(format!(
                "pace_improvement must be in [0, 1), got {}",
                self.pace_improvement
            )));
        }
        if self.target_horizon_days == 0 {
            return Err(EngineError::InvalidConfig(
                "target_horizon_days must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Parse and validate the `[engine]` table from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, EngineError> {
        let file: ConfigFile = toml::from_str(content)?;
        file.engine.validate()?;
        Ok(file.engine)
    }

    /// Load from a config.toml file.
    pub fn load(path: &Path) -> Result<Self, EngineError> {
        let content = std::fs::read_to_string(path).map_err(|source| EngineError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Load from a config.toml file, or use defaults if it does not exist.
    /// A file that exists but does not parse is still an error.
    pub fn load_or_default(path: &Path) -> Result<Self, EngineError> {
        if !path.exists() {
            tracing::debug!("no engine config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        Self::load(path)
    }

    pub fn target_horizon(&self) -> chrono::Duration {
        chrono::Duration::days(i64::from(self.target_horizon_days))
    }

    pub fn notification_visible_for(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.notification_visible_secs)
    }
}
