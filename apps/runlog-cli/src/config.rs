// config.rs — Where Runlog keeps its state.
//
// `for_project()` lays everything out under a `.runlog/` directory in the
// project root:
//   .runlog/goals/        one JSON file per goal
//   .runlog/runs/         one JSON file per run
//   .runlog/events.jsonl  notification log
//   .runlog/config.toml   engine tuning ([engine] table)

use std::path::{Path, PathBuf};

use runlog_engine::{EngineConfig, EngineError};

#[derive(Debug, Clone)]
pub struct RunlogConfig {
    pub goals_dir: PathBuf,
    pub runs_dir: PathBuf,
    pub events_log: PathBuf,
    pub config_file: PathBuf,
}

impl RunlogConfig {
    pub fn for_project(project_root: impl AsRef<Path>) -> Self {
        let dir = project_root.as_ref().join(".runlog");
        Self {
            goals_dir: dir.join("goals"),
            runs_dir: dir.join("runs"),
            events_log: dir.join("events.jsonl"),
            config_file: dir.join("config.toml"),
        }
    }

    /// Engine tuning from config.toml, or defaults when the file is absent.
    pub fn engine(&self) -> Result<EngineConfig, EngineError> {
        EngineConfig::load_or_default(&self.config_file)
    }
}
