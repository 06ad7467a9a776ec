//! # runlog-engine
//!
//! Automatic goal generation for Runlog.
//!
//! Given a runner's history and existing goals, the engine decides whether a
//! new goal should be created, computes its target, and makes sure it is
//! generated and persisted at most once per triggering condition.
//!
//! ```text
//! runs + goals → GoalGenerationController → GenerationGuard (gate)
//!                                         → GoalCalculator (compute)
//!              → on_generated callback → CompletionNotifier (persist once + notify)
//! ```
//!
//! ## Key components
//!
//! - [`GoalCalculator`] / [`TrailingWindowCalculator`] — pure target computation
//! - [`GenerationGuard`] — the in-flight flag and processed-once latch
//! - [`GoalGenerationController`] — runs guard and calculator for one activation
//! - [`CompletionNotifier`] — saves a generated goal once and announces it
//! - [`EngineConfig`] — tuning knobs, loaded from `config.toml`

pub mod calculator;
pub mod config;
pub mod controller;
pub mod error;
pub mod format;
pub mod guard;
pub mod notifier;
pub mod summary;

pub use calculator::{GoalCalculator, TrailingWindowCalculator};
pub use config::EngineConfig;
pub use controller::GoalGenerationController;
pub use error::EngineError;
pub use guard::{GenerationGuard, SkipReason};
pub use notifier::CompletionNotifier;
pub use summary::PerformanceSummary;
