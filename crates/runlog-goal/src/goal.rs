// goal.rs — Goal: a performance target derived from run history.
//
// Goals produced by the generation engine start Active. Collaborators
// outside the engine move them on:
//   Active → Completed
//   Active → Abandoned
// Completed and Abandoned are terminal. Goals are never deleted by the engine.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::GoalError;

/// The lifecycle status of a Goal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum GoalStatus {
    /// The runner is working toward this goal. At most one per user.
    Active,

    /// The target was reached.
    Completed,

    /// The runner gave up on it (or it expired).
    Abandoned,
}

impl fmt::Display for GoalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GoalStatus::Active => write!(f, "active"),
            GoalStatus::Completed => write!(f, "completed"),
            GoalStatus::Abandoned => write!(f, "abandoned"),
        }
    }
}

impl std::str::FromStr for GoalStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "active" => Ok(GoalStatus::Active),
            "completed" => Ok(GoalStatus::Completed),
            "abandoned" => Ok(GoalStatus::Abandoned),
            other => Err(format!(
                "unknown goal status '{}' (expected active, completed, abandoned)",
                other
            )),
        }
    }
}

impl GoalStatus {
    /// Only an Active goal can move, and only to a terminal status.
    pub fn can_transition_to(&self, next: &GoalStatus) -> bool {
        matches!(
            (self, next),
            (GoalStatus::Active, GoalStatus::Completed) | (GoalStatus::Active, GoalStatus::Abandoned)
        )
    }
}

/// A distance/pace target the runner should reach by `target_date`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Goal {
    /// Goal identity. Engine-produced goals derive it from their inputs.
    pub id: Uuid,

    pub user_id: String,

    /// Distance to cover, in kilometres.
    pub target_distance_km: f64,

    /// Pace to hold over that distance, in seconds per kilometre.
    pub target_pace_secs_per_km: f64,

    /// Deadline for reaching the target.
    pub target_date: DateTime<Utc>,

    pub status: GoalStatus,

    /// True for goals produced by the generation engine.
    #[serde(default)]
    pub auto_generated: bool,

    /// How many completed runs the target was derived from.
    #[serde(default)]
    pub based_on_runs: usize,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl Goal {
    /// Create a new Active goal with a fresh identifier.
    pub fn new(
        user_id: impl Into<String>,
        target_distance_km: f64,
        target_pace_secs_per_km: f64,
        target_date: DateTime<Utc>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id: user_id.into(),
            target_distance_km,
            target_pace_secs_per_km,
            target_date,
            status: GoalStatus::Active,
            auto_generated: false,
            based_on_runs: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == GoalStatus::Active
    }

    /// Target duration for the whole distance, in seconds.
    pub fn target_duration_secs(&self) -> f64 {
        self.target_distance_km * self.target_pace_secs_per_km
    }

    /// Transition to a new status. Returns an error if the transition is invalid.
    pub fn transition(&mut self, new_status: GoalStatus) -> Result<(), GoalError> {
        if !self.status.can_transition_to(&new_status) {
            return Err(GoalError::InvalidTransition {
                goal_id: self.id,
                from: self.status.to_string(),
                to: new_status.to_string(),
            });
        }
        self.status = new_status;
        self.updated_at = Utc::now();
        Ok(())
    }
}

/// A goal as confirmed by a [`GoalStore`](crate::store::GoalStore).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PersistedGoal {
    pub goal: Goal,
    pub persisted_at: DateTime<Utc>,
}

impl PersistedGoal {
    pub fn id(&self) -> Uuid {
        self.goal.id
    }
}
