// error.rs — Error types for the goal generation engine.

use std::path::PathBuf;

use runlog_goal::GoalError;
use thiserror::Error;

/// Errors raised while computing goals or loading engine configuration.
///
/// None of these escape `GoalGenerationController`; they are reported and
/// turned into "no goal generated".
#[derive(Debug, Error)]
pub enum EngineError {
    /// A run or goal record failed validation.
    #[error(transparent)]
    Record(#[from] GoalError),

    /// The engine configuration is out of range.
    #[error("invalid engine config: {0}")]
    InvalidConfig(String),

    /// Failed to read the config file.
    #[error("failed to read config {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to parse the config file.
    #[error("failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// A computed target came out as NaN or infinity.
    #[error("computed {field} is not a finite number")]
    NonFinite { field: &'static str },

    /// The calculator panicked. The payload message is kept when it is a string.
    #[error("goal calculator panicked: {0}")]
    CalculatorPanicked(String),
}
