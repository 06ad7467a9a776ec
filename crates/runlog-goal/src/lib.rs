//! # runlog-goal
//!
//! Run and goal records for Runlog, plus the collaborators the goal
//! generation engine talks to.
//!
//! A [`Run`] is an immutable fact logged by the runner. A [`Goal`] is a
//! target derived from those runs; once persisted it is Active until a
//! collaborator marks it Completed or Abandoned.
//!
//! ## Key components
//!
//! - [`Run`] / [`Goal`] — the records, with [`GoalStatus`] transition rules
//!   (Active → Completed | Abandoned)
//! - [`GoalStore`] / [`RunSource`] — narrow async persistence interfaces
//! - [`JsonGoalStore`] / [`JsonRunStore`] — JSON file-based implementations
//! - [`Notification`] / [`NotificationSink`] — user-facing messages
//! - [`ErrorReporter`] — fire-and-forget error reporting

pub mod error;
pub mod goal;
pub mod notify;
pub mod report;
pub mod run;
pub mod store;

pub use error::GoalError;
pub use goal::{Goal, GoalStatus, PersistedGoal};
pub use notify::{LogSink, Notification, NotificationDispatcher, NotificationKind, NotificationSink};
pub use report::{ErrorReporter, TracingReporter};
pub use run::{Run, RunLocation, RunStatus};
pub use store::{GoalStore, JsonGoalStore, JsonRunStore, RunSource};
