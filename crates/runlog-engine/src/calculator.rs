// calculator.rs — Pure goal target computation.
//
// A calculator maps (user, runs, goals, now) to an optional goal proposal.
// It never touches the clock, the disk, or any shared state: the same input
// always produces the same goal, identity included.
//
// Whether a goal *should* be generated (active goal present, already
// processed) is decided by the GenerationGuard, not here. The calculator
// always attempts a computation from the runs it is given.

use chrono::{DateTime, Utc};
use runlog_goal::{Goal, GoalStatus, Run};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::config::EngineConfig;
use crate::error::EngineError;

/// Computes a stretch goal from run history.
///
/// Contract for any implementation returning `Ok(Some(goal))`:
/// - `goal.target_distance_km` ≥ the reference recent distance
/// - `goal.target_pace_secs_per_km` ≤ the reference recent pace
/// - `goal.target_date` > `now`
/// - only Completed runs influence the result
///
/// `Ok(None)` means there is not enough data; it is not an error.
pub trait GoalCalculator: Send {
    fn compute(
        &self,
        user_id: &str,
        runs: &[Run],
        goals: &[Goal],
        now: DateTime<Utc>,
    ) -> Result<Option<Goal>, EngineError>;
}

/// Percentage improvement over a trailing window of recent completed runs.
///
/// Reference distance is the mean distance of the window; reference pace is
/// the window's total duration over its total distance. Targets are
/// `distance × (1 + distance_increase)` rounded to 0.01 km and
/// `pace × (1 − pace_improvement)` truncated to whole seconds. A target is
/// never easier than the most recently completed goal.
#[derive(Debug, Clone, Default)]
pub struct TrailingWindowCalculator {
    config: EngineConfig,
}

impl TrailingWindowCalculator {
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}

impl GoalCalculator for TrailingWindowCalculator {
    fn compute(
        &self,
        user_id: &str,
        runs: &[Run],
        goals: &[Goal],
        now: DateTime<Utc>,
    ) -> Result<Option<Goal>, EngineError> {
        let mut completed: Vec<&Run> = runs
            .iter()
            .filter(|r| r.user_id == user_id && r.is_completed())
            .collect();
        for run in &completed {
            run.validate()?;
        }

        if completed.is_empty() || completed.len() < self.config.min_runs {
            tracing::debug!(
                user_id,
                completed = completed.len(),
                min_runs = self.config.min_runs,
                "not enough completed runs for a goal"
            );
            return Ok(None);
        }

        // Newest first; id breaks ties so the window is stable for equal dates.
        completed.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| a.id.cmp(&b.id)));
        let window = &completed[..completed.len().min(self.config.window_size)];

        let total_distance: f64 = window.iter().map(|r| r.distance_km).sum();
        let total_duration: f64 = window.iter().map(|r| r.duration_secs as f64).sum();
        let reference_distance = total_distance / window.len() as f64;
        let reference_pace = total_duration / total_distance;

        let mut target_distance =
            round_hundredths(reference_distance * (1.0 + self.config.distance_increase))
                .max(reference_distance);

        let raw_pace = reference_pace * (1.0 - self.config.pace_improvement);
        let mut target_pace = if raw_pace.floor() > 0.0 {
            raw_pace.floor()
        } else {
            raw_pace
        };

        if let Some(previous) = last_completed_goal(user_id, goals) {
            target_distance = target_distance.max(previous.target_distance_km);
            target_pace = target_pace.min(previous.target_pace_secs_per_km);
        }

        if !target_distance.is_finite() {
            return Err(EngineError::NonFinite {
                field: "target distance",
            });
        }
        if !target_pace.is_finite() {
            return Err(EngineError::NonFinite { field: "target pace" });
        }

        let target_date = now + self.config.target_horizon();
        let id = derive_goal_id(user_id, now, window, target_distance, target_pace);

        Ok(Some(Goal {
            id,
            user_id: user_id.to_string(),
            target_distance_km: target_distance,
            target_pace_secs_per_km: target_pace,
            target_date,
            status: GoalStatus::Active,
            auto_generated: true,
            based_on_runs: window.len(),
            created_at: now,
            updated_at: now,
        }))
    }
}

fn round_hundredths(km: f64) -> f64 {
    (km * 100.0).round() / 100.0
}

/// The user's most recently updated Completed goal, if any.
fn last_completed_goal<'a>(user_id: &str, goals: &'a [Goal]) -> Option<&'a Goal> {
    goals
        .iter()
        .filter(|g| g.user_id == user_id && g.status == GoalStatus::Completed)
        .filter(|g| g.target_distance_km.is_finite() && g.target_pace_secs_per_km.is_finite())
        .max_by_key(|g| g.updated_at)
}

/// Goal identity from a SHA-256 digest of everything the goal was derived from.
fn derive_goal_id(
    user_id: &str,
    now: DateTime<Utc>,
    window: &[&Run],
    target_distance: f64,
    target_pace: f64,
) -> Uuid {
    let mut hasher = Sha256::new();
    hasher.update(user_id.as_bytes());
    hasher.update(now.to_rfc3339().as_bytes());
    for run in window {
        hasher.update(run.id.as_bytes());
    }
    hasher.update(target_distance.to_bits().to_le_bytes());
    hasher.update(target_pace.to_bits().to_le_bytes());
    let digest = hasher.finalize();

    let mut bytes = [0u8; 16];
    bytes.copy_from_slice(&digest[..16]);
    Uuid::from_bytes(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use runlog_goal::RunStatus;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 18, 12, 0, 0).unwrap()
    }

    fn run(days_ago: i64, km: f64, secs: u64) -> Run {
        Run::new("user-1", now() - Duration::days(days_ago), km, secs)
    }

    fn calculator() -> TrailingWindowCalculator {
        TrailingWindowCalculator::default()
    }

    #[test]
    fn no_runs_means_no_goal() {
        let result = calculator().compute("user-1", &[], &[], now()).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn single_five_k_gives_stretch_goal() {
        let runs = vec![run(1, 5.0, 1800)];
        let goal = calculator().compute("user-1", &runs, &[], now()).unwrap().unwrap();

        assert_eq!(goal.target_distance_km, 5.5);
        assert_eq!(goal.target_pace_secs_per_km, 349.0);
        assert!(goal.target_distance_km >= 5.0);
        assert!(goal.target_pace_secs_per_km <= 360.0);
        assert!(goal.target_date > now());
        assert_eq!(goal.target_date, now() + Duration::days(28));
        assert_eq!(goal.status, GoalStatus::Active);
        assert!(goal.auto_generated);
        assert_eq!(goal.based_on_runs, 1);
        assert_eq!(goal.user_id, "user-1");
    }

    #[test]
    fn non_completed_runs_are_ignored() {
        let runs = vec![
            run(1, 5.0, 1800),
            run(0, 42.0, 9000).with_status(RunStatus::InProgress),
            run(2, 1.0, 200).with_status(RunStatus::Cancelled),
        ];
        let goal = calculator().compute("user-1", &runs, &[], now()).unwrap().unwrap();
        assert_eq!(goal.target_distance_km, 5.5);
        assert_eq!(goal.based_on_runs, 1);
    }

    #[test]
    fn only_non_completed_runs_means_no_goal() {
        let runs = vec![run(1, 5.0, 1800).with_status(RunStatus::Cancelled)];
        assert!(calculator().compute("user-1", &runs, &[], now()).unwrap().is_none());
    }

    #[test]
    fn other_users_runs_are_ignored() {
        let mut stranger = run(1, 50.0, 9000);
        stranger.user_id = "user-2".to_string();
        assert!(calculator().compute("user-1", &[stranger], &[], now()).unwrap().is_none());
    }

    #[test]
    fn window_uses_most_recent_runs() {
        let config = EngineConfig {
            window_size: 2,
            ..Default::default()
        };
        let calc = TrailingWindowCalculator::new(config).unwrap();
        let runs = vec![
            run(30, 20.0, 7200), // outside the window
            run(2, 4.0, 1200),
            run(1, 6.0, 1800),
        ];
        let goal = calc.compute("user-1", &runs, &[], now()).unwrap().unwrap();
        // Mean distance 5.0 → 5.5; pace 3000s / 10km = 300 → 291.
        assert_eq!(goal.target_distance_km, 5.5);
        assert_eq!(goal.target_pace_secs_per_km, 291.0);
        assert_eq!(goal.based_on_runs, 2);
    }

    #[test]
    fn min_runs_not_met_means_no_goal() {
        let config = EngineConfig {
            min_runs: 3,
            ..Default::default()
        };
        let calc = TrailingWindowCalculator::new(config).unwrap();
        let runs = vec![run(2, 5.0, 1800), run(1, 5.0, 1800)];
        assert!(calc.compute("user-1", &runs, &[], now()).unwrap().is_none());
    }

    #[test]
    fn result_is_deterministic() {
        let runs = vec![run(3, 8.0, 2800), run(1, 5.0, 1800)];
        let a = calculator().compute("user-1", &runs, &[], now()).unwrap().unwrap();
        let b = calculator().compute("user-1", &runs, &[], now()).unwrap().unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn identity_changes_with_inputs() {
        let runs = vec![run(1, 5.0, 1800)];
        let a = calculator().compute("user-1", &runs, &[], now()).unwrap().unwrap();
        let later = calculator()
            .compute("user-1", &runs, &[], now() + Duration::hours(1))
            .unwrap()
            .unwrap();
        assert_ne!(a.id, later.id);
    }

    #[test]
    fn invalid_completed_run_is_an_error() {
        let mut bad = run(1, 5.0, 1800);
        bad.distance_km = 0.0;
        let result = calculator().compute("user-1", &[bad], &[], now());
        assert!(matches!(result, Err(EngineError::Record(_))));
    }

    #[test]
    fn invalid_cancelled_run_is_ignored() {
        let mut bad = run(1, 0.0, 0).with_status(RunStatus::Cancelled);
        bad.distance_km = f64::NAN;
        let runs = vec![bad, run(2, 5.0, 1800)];
        assert!(calculator().compute("user-1", &runs, &[], now()).unwrap().is_some());
    }

    #[test]
    fn never_easier_than_last_completed_goal() {
        let mut previous = Goal::new("user-1", 8.0, 320.0, now() - Duration::days(1));
        previous.transition(GoalStatus::Completed).unwrap();
        let runs = vec![run(1, 5.0, 1800)];

        let goal = calculator()
            .compute("user-1", &runs, &[previous], now())
            .unwrap()
            .unwrap();
        assert_eq!(goal.target_distance_km, 8.0);
        assert_eq!(goal.target_pace_secs_per_km, 320.0);
    }

    #[test]
    fn active_goals_do_not_stop_computation() {
        let active = Goal::new("user-1", 5.0, 360.0, now() + Duration::days(3));
        let runs = vec![run(1, 5.0, 1800)];
        assert!(calculator()
            .compute("user-1", &runs, &[active], now())
            .unwrap()
            .is_some());
    }

    #[test]
    fn zero_improvement_keeps_reference_targets() {
        let config = EngineConfig {
            distance_increase: 0.0,
            pace_improvement: 0.0,
            ..Default::default()
        };
        let calc = TrailingWindowCalculator::new(config).unwrap();
        let runs = vec![run(1, 5.123, 1800)];
        let goal = calc.compute("user-1", &runs, &[], now()).unwrap().unwrap();
        assert!(goal.target_distance_km >= 5.123);
        assert!(goal.target_pace_secs_per_km <= runs[0].pace_secs_per_km());
    }

    #[test]
    fn very_fast_pace_keeps_fractional_target() {
        // 1 second over 10 km: 0.1 s/km reference pace.
        let runs = vec![run(1, 10.0, 1)];
        let goal = calculator().compute("user-1", &runs, &[], now()).unwrap().unwrap();
        assert!(goal.target_pace_secs_per_km > 0.0);
        assert!(goal.target_pace_secs_per_km <= 0.1);
    }

    #[test]
    fn invalid_config_rejected_at_construction() {
        let config = EngineConfig {
            window_size: 0,
            ..Default::default()
        };
        assert!(TrailingWindowCalculator::new(config).is_err());
    }
}
