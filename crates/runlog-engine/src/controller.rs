// controller.rs — GoalGenerationController: one activation of the engine.
//
// The host calls `on_activate` as often as it likes (every time its run or
// goal lists change); the guard makes sure only the first eligible call
// computes anything. `force_check` is the host-initiated re-check, e.g. after
// the active goal was abandoned: it skips the processed latch but still
// honours the in-flight flag and the single-active-goal rule.
//
// Calculator failures, including panics, never reach the host. They are
// reported and the attempt counts as "no goal generated".

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use runlog_goal::{ErrorReporter, Goal, Run, TracingReporter};

use crate::calculator::{GoalCalculator, TrailingWindowCalculator};
use crate::error::EngineError;
use crate::guard::GenerationGuard;

/// Called with every generated goal, before `on_activate`/`force_check` return.
pub type GoalCallback = Box<dyn FnMut(&Goal) + Send>;

pub struct GoalGenerationController<C: GoalCalculator = TrailingWindowCalculator> {
    calculator: C,
    guard: GenerationGuard,
    reporter: Arc<dyn ErrorReporter>,
    on_generated: Option<GoalCallback>,
    clock: fn() -> DateTime<Utc>,
    last_generated: Option<Goal>,
}

impl<C: GoalCalculator> GoalGenerationController<C> {
    /// A new controller is a new activation scope: its guard starts clear.
    pub fn new(calculator: C) -> Self {
        Self {
            calculator,
            guard: GenerationGuard::new(),
            reporter: Arc::new(TracingReporter),
            on_generated: None,
            clock: Utc::now,
            last_generated: None,
        }
    }

    pub fn with_reporter(mut self, reporter: Arc<dyn ErrorReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    pub fn on_generated(mut self, callback: impl FnMut(&Goal) + Send + 'static) -> Self {
        self.on_generated = Some(Box::new(callback));
        self
    }

    /// Replace the wall clock used to stamp goals.
    pub fn with_clock(mut self, clock: fn() -> DateTime<Utc>) -> Self {
        self.clock = clock;
        self
    }

    /// Automatic once-per-activation path.
    pub fn on_activate(&mut self, user_id: &str, runs: &[Run], goals: &[Goal]) -> Option<Goal> {
        if !has_input(user_id, runs) {
            return None;
        }
        if let Err(reason) = self.guard.check(goals) {
            tracing::debug!(user_id, %reason, "goal generation skipped");
            return None;
        }
        self.attempt(user_id, runs, goals)
    }

    /// Manual re-check: bypasses the processed latch only.
    pub fn force_check(&mut self, user_id: &str, runs: &[Run], goals: &[Goal]) -> Option<Goal> {
        if !has_input(user_id, runs) {
            return None;
        }
        if let Err(reason) = self.guard.check_forced(goals) {
            tracing::debug!(user_id, %reason, "forced goal check skipped");
            return None;
        }
        self.attempt(user_id, runs, goals)
    }

    fn attempt(&mut self, user_id: &str, runs: &[Run], goals: &[Goal]) -> Option<Goal> {
        let now = (self.clock)();
        let outcome = {
            let _attempt = self.guard.begin();
            let calculator = &self.calculator;
            panic::catch_unwind(AssertUnwindSafe(|| {
                calculator.compute(user_id, runs, goals, now)
            }))
            .unwrap_or_else(|payload| Err(EngineError::CalculatorPanicked(panic_message(payload))))
        };

        let goal = match outcome {
            Ok(Some(goal)) => goal,
            Ok(None) => {
                tracing::debug!(user_id, "no goal generated: not enough data");
                return None;
            }
            Err(e) => {
                self.reporter.report("goal generation", &e);
                return None;
            }
        };

        tracing::info!(
            user_id,
            goal_id = %goal.id,
            distance_km = goal.target_distance_km,
            pace_secs_per_km = goal.target_pace_secs_per_km,
            "goal generated"
        );
        if let Some(callback) = self.on_generated.as_mut() {
            callback(&goal);
        }
        self.last_generated = Some(goal.clone());
        Some(goal)
    }

    /// Start a fresh activation scope without rebuilding the controller.
    pub fn reset(&mut self) {
        self.guard.reset();
        self.last_generated = None;
    }

    pub fn guard(&self) -> &GenerationGuard {
        &self.guard
    }

    /// The goal produced in this activation, if any.
    pub fn last_generated(&self) -> Option<&Goal> {
        self.last_generated.as_ref()
    }

    pub fn calculator(&self) -> &C {
        &self.calculator
    }
}

/// Nothing to evaluate yet (e.g. the host has not loaded runs). Not an attempt.
fn has_input(user_id: &str, runs: &[Run]) -> bool {
    !user_id.is_empty() && !runs.is_empty()
}

fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
