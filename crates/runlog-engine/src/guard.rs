// guard.rs — GenerationGuard: at most one generation attempt per activation.
//
// Two flags, owned by one controller (one activation scope):
//   in_flight — an attempt is running; re-entrant evaluations are dropped
//   processed — an attempt has finished (goal or not); latched until reset
//
// A third condition needs no state: if the user already has an Active goal,
// nothing is generated.

use runlog_goal::Goal;

/// Why the guard refused a generation attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Another attempt is still running.
    InFlight,
    /// This activation already made its attempt.
    AlreadyProcessed,
    /// The user already has an Active goal.
    ActiveGoalExists,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::InFlight => write!(f, "generation already in flight"),
            SkipReason::AlreadyProcessed => write!(f, "already processed in this activation"),
            SkipReason::ActiveGoalExists => write!(f, "an active goal already exists"),
        }
    }
}

#[derive(Debug, Default)]
pub struct GenerationGuard {
    processed: bool,
    in_flight: bool,
}

impl GenerationGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when a new generation attempt may start.
    pub fn should_generate(&self, goals: &[Goal]) -> bool {
        self.check(goals).is_ok()
    }

    /// Like [`should_generate`](Self::should_generate), but says why not.
    pub fn check(&self, goals: &[Goal]) -> Result<(), SkipReason> {
        if self.in_flight {
            return Err(SkipReason::InFlight);
        }
        if self.processed {
            return Err(SkipReason::AlreadyProcessed);
        }
        Self::check_no_active(goals)
    }

    /// The check used by a manual re-check: ignores the processed latch but
    /// still honours the in-flight flag and the single-active-goal rule.
    pub fn check_forced(&self, goals: &[Goal]) -> Result<(), SkipReason> {
        if self.in_flight {
            return Err(SkipReason::InFlight);
        }
        Self::check_no_active(goals)
    }

    fn check_no_active(goals: &[Goal]) -> Result<(), SkipReason> {
        if goals.iter().any(Goal::is_active) {
            return Err(SkipReason::ActiveGoalExists);
        }
        Ok(())
    }

    /// Mark an attempt as started. The returned token finishes the attempt
    /// when dropped: `in_flight` is cleared and `processed` latched, whatever
    /// the outcome (including a panic unwinding through the caller).
    pub fn begin(&mut self) -> Attempt<'_> {
        self.in_flight = true;
        Attempt { guard: self }
    }

    /// External reset: a new activation scope on the same guard.
    pub fn reset(&mut self) {
        self.processed = false;
        self.in_flight = false;
    }

    pub fn is_processed(&self) -> bool {
        self.processed
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }
}

/// An in-flight generation attempt. See [`GenerationGuard::begin`].
#[must_use = "dropping the attempt immediately finishes it"]
pub struct Attempt<'a> {
    guard: &'a mut GenerationGuard,
}

impl Attempt<'_> {
    /// Whether the guard is currently in flight (always true while held).
    pub fn is_in_flight(&self) -> bool {
        self.guard.in_flight
    }
}

impl Drop for Attempt<'_> {
    fn drop(&mut self) {
        self.guard.in_flight = false;
        self.guard.processed = true;
    }
}
