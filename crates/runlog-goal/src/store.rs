// store.rs — Goal and run persistence.
//
// The engine only ever sees the two narrow traits here: `GoalStore` (save a
// generated goal, list a user's goals) and `RunSource` (read a user's runs).
// The JSON implementations keep one file per record:
//   <goals_dir>/<goal_id>.json
//   <runs_dir>/<run_id>.json
// which keeps records isolated and easy to inspect by hand.

use std::fs;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use uuid::Uuid;

use crate::error::GoalError;
use crate::goal::{Goal, GoalStatus, PersistedGoal};
use crate::run::Run;

/// Where generated goals are written.
#[async_trait]
pub trait GoalStore: Send + Sync {
    /// Persist a goal. The returned record always carries status Active.
    async fn save(&self, goal: &Goal) -> Result<PersistedGoal, GoalError>;

    /// All goals belonging to `user_id`, newest first.
    async fn list(&self, user_id: &str) -> Result<Vec<Goal>, GoalError>;
}

/// Read-only access to a user's run history.
#[async_trait]
pub trait RunSource: Send + Sync {
    async fn runs_for(&self, user_id: &str) -> Result<Vec<Run>, GoalError>;
}

/// A directory of `<uuid>.json` records.
struct JsonDir {
    dir: PathBuf,
}

impl JsonDir {
    fn open(dir: impl AsRef<Path>) -> Result<Self, GoalError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir).map_err(|source| GoalError::IoError {
            path: dir.display().to_string(),
            source,
        })?;
        Ok(Self { dir })
    }

    fn file(&self, id: Uuid) -> PathBuf {
        self.dir.join(format!("{}.json", id))
    }

    fn write<T: Serialize>(&self, id: Uuid, record: &T) -> Result<(), GoalError> {
        let path = self.file(id);
        let json = serde_json::to_string_pretty(record)?;
        fs::write(&path, json).map_err(|source| GoalError::IoError {
            path: path.display().to_string(),
            source,
        })
    }

    fn read<T: DeserializeOwned>(&self, id: Uuid) -> Result<Option<T>, GoalError> {
        let path = self.file(id);
        if !path.exists() {
            return Ok(None);
        }
        let json = fs::read_to_string(&path).map_err(|source| GoalError::IoError {
            path: path.display().to_string(),
            source,
        })?;
        Ok(Some(serde_json::from_str(&json)?))
    }

    /// Every parseable record in the directory. Unparseable files are skipped.
    fn read_all<T: DeserializeOwned>(&self) -> Result<Vec<T>, GoalError> {
        let mut records = Vec::new();

        let entries = fs::read_dir(&self.dir).map_err(|source| GoalError::IoError {
            path: self.dir.display().to_string(),
            source,
        })?;

        for entry in entries {
            let entry = entry.map_err(|source| GoalError::IoError {
                path: self.dir.display().to_string(),
                source,
            })?;
            let path = entry.path();

            if path.extension().is_some_and(|ext| ext == "json") {
                let json = fs::read_to_string(&path).map_err(|source| GoalError::IoError {
                    path: path.display().to_string(),
                    source,
                })?;
                match serde_json::from_str::<T>(&json) {
                    Ok(record) => records.push(record),
                    Err(e) => tracing::warn!("skipping unreadable record {}: {}", path.display(), e),
                }
            }
        }

        Ok(records)
    }
}

/// JSON file-based goal store.
pub struct JsonGoalStore {
    dir: JsonDir,
}

impl JsonGoalStore {
    /// Create a store backed by the given directory, creating it if needed.
    pub fn new(goals_dir: impl AsRef<Path>) -> Result<Self, GoalError> {
        Ok(Self {
            dir: JsonDir::open(goals_dir)?,
        })
    }

    /// Write a goal as-is (creates or overwrites).
    pub fn put(&self, goal: &Goal) -> Result<(), GoalError> {
        self.dir.write(goal.id, goal)
    }

    pub fn get(&self, goal_id: Uuid) -> Result<Option<Goal>, GoalError> {
        self.dir.read(goal_id)
    }

    /// Goals for one user, newest first.
    pub fn list_for_user(&self, user_id: &str) -> Result<Vec<Goal>, GoalError> {
        let mut goals: Vec<Goal> = self
            .dir
            .read_all::<Goal>()?
            .into_iter()
            .filter(|g| g.user_id == user_id)
            .collect();
        goals.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(goals)
    }

    pub fn list_by_status(&self, user_id: &str, status: GoalStatus) -> Result<Vec<Goal>, GoalError> {
        Ok(self
            .list_for_user(user_id)?
            .into_iter()
            .filter(|g| g.status == status)
            .collect())
    }

    /// Move a stored goal to a new status and save it.
    pub fn transition(&self, goal_id: Uuid, new_status: GoalStatus) -> Result<Goal, GoalError> {
        let mut goal = self.get(goal_id)?.ok_or(GoalError::NotFound(goal_id))?;
        goal.transition(new_status)?;
        self.put(&goal)?;
        Ok(goal)
    }
}

#[async_trait]
impl GoalStore for JsonGoalStore {
    async fn save(&self, goal: &Goal) -> Result<PersistedGoal, GoalError> {
        let mut goal = goal.clone();
        goal.status = GoalStatus::Active;
        goal.updated_at = Utc::now();
        self.put(&goal)?;
        tracing::debug!(goal_id = %goal.id, "goal written");
        Ok(PersistedGoal {
            goal,
            persisted_at: Utc::now(),
        })
    }

    async fn list(&self, user_id: &str) -> Result<Vec<Goal>, GoalError> {
        self.list_for_user(user_id)
    }
}

/// JSON file-based run log.
pub struct JsonRunStore {
    dir: JsonDir,
}

impl JsonRunStore {
    pub fn new(runs_dir: impl AsRef<Path>) -> Result<Self, GoalError> {
        Ok(Self {
            dir: JsonDir::open(runs_dir)?,
        })
    }

    /// Record a run. Runs are immutable, so writing an existing id is rejected.
    pub fn add(&self, run: &Run) -> Result<(), GoalError> {
        run.validate()?;
        if self.dir.file(run.id).exists() {
            return Err(GoalError::StoreError(format!("run {} already recorded", run.id)));
        }
        self.dir.write(run.id, run)
    }

    pub fn get(&self, run_id: Uuid) -> Result<Option<Run>, GoalError> {
        self.dir.read(run_id)
    }

    /// Runs for one user, newest first.
    pub fn list_for_user(&self, user_id: &str) -> Result<Vec<Run>, GoalError> {
        let mut runs: Vec<Run> = self
            .dir
            .read_all::<Run>()?
            .into_iter()
            .filter(|r| r.user_id == user_id)
            .collect();
        runs.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(runs)
    }

    /// Runs for one user on or after `since`, newest first.
    pub fn list_since(&self, user_id: &str, since: DateTime<Utc>) -> Result<Vec<Run>, GoalError> {
        Ok(self
            .list_for_user(user_id)?
            .into_iter()
            .filter(|r| r.date >= since)
            .collect())
    }
}

#[async_trait]
impl RunSource for JsonRunStore {
    async fn runs_for(&self, user_id: &str) -> Result<Vec<Run>, GoalError> {
        self.list_for_user(user_id)
    }
}
