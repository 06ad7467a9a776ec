// run.rs — Run: one logged run, an immutable historical fact.
//
// Runs are produced by the log-entry flow and are read-only input to the
// goal engine. Only Completed runs count toward goal targets; InProgress and
// Cancelled runs are kept for the log but never influence calculation.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::GoalError;

/// Status of a logged run.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Completed,
    InProgress,
    Cancelled,
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunStatus::Completed => write!(f, "completed"),
            RunStatus::InProgress => write!(f, "in_progress"),
            RunStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl std::str::FromStr for RunStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace([' ', '-'], "_").as_str() {
            "completed" => Ok(RunStatus::Completed),
            "in_progress" => Ok(RunStatus::InProgress),
            "cancelled" | "canceled" => Ok(RunStatus::Cancelled),
            other => Err(format!(
                "unknown run status '{}' (expected completed, in_progress, cancelled)",
                other
            )),
        }
    }
}

/// Where a run took place.
///
/// `label` is free-text location kept for records logged before the
/// state/city lookup existed.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RunLocation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl RunLocation {
    /// Human-readable form: "City, State", falling back to the legacy label.
    pub fn display_name(&self) -> Option<String> {
        match (&self.city_name, &self.state_name) {
            (Some(city), Some(state)) => Some(format!("{}, {}", city, state)),
            (Some(city), None) => Some(city.clone()),
            (None, Some(state)) => Some(state.clone()),
            (None, None) => self.label.clone(),
        }
    }
}

/// A single logged run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Run {
    /// Unique identifier for this run.
    pub id: Uuid,

    /// The runner who logged it.
    pub user_id: String,

    /// When the run happened.
    pub date: DateTime<Utc>,

    /// Distance in kilometres. Always > 0 for a valid run.
    pub distance_km: f64,

    /// Elapsed time in seconds. Always > 0 for a valid run.
    pub duration_secs: u64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    pub status: RunStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<RunLocation>,
}

impl Run {
    /// Create a new Completed run with a fresh identifier.
    pub fn new(
        user_id: impl Into<String>,
        date: DateTime<Utc>,
        distance_km: f64,
        duration_secs: u64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: user_id.into(),
            date,
            distance_km,
            duration_secs,
            notes: None,
            status: RunStatus::Completed,
            location: None,
        }
    }

    pub fn with_status(mut self, status: RunStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn with_location(mut self, location: RunLocation) -> Self {
        self.location = Some(location);
        self
    }

    pub fn is_completed(&self) -> bool {
        self.status == RunStatus::Completed
    }

    /// Average pace in seconds per kilometre.
    pub fn pace_secs_per_km(&self) -> f64 {
        self.duration_secs as f64 / self.distance_km
    }

    /// Check the distance and duration invariants.
    pub fn validate(&self) -> Result<(), GoalError> {
        if !self.distance_km.is_finite() || self.distance_km <= 0.0 {
            return Err(GoalError::InvalidRun {
                run_id: self.id,
                reason: format!("distance must be a positive number of km, got {}", self.distance_km),
            });
        }
        if self.duration_secs == 0 {
            return Err(GoalError::InvalidRun {
                run_id: self.id,
                reason: "duration must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}
