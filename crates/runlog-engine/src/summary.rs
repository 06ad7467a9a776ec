// summary.rs — Aggregate performance over a set of completed runs.

use chrono::{DateTime, Utc};
use runlog_goal::Run;
use serde::Serialize;

/// Aggregates over completed, valid runs. Other runs are ignored.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerformanceSummary {
    pub run_count: usize,
    pub total_distance_km: f64,
    pub total_duration_secs: u64,
    pub average_distance_km: f64,
    /// Total duration over total distance, so long runs weigh more.
    pub average_pace_secs_per_km: f64,
    pub best_pace_secs_per_km: f64,
    pub longest_run_km: f64,
    /// Runs per week between the first and last run (at least one week).
    pub runs_per_week: f64,
    pub first_run: DateTime<Utc>,
    pub last_run: DateTime<Utc>,
}

impl PerformanceSummary {
    /// Returns `None` when there is no completed, valid run.
    pub fn from_runs<'a>(runs: impl IntoIterator<Item = &'a Run>) -> Option<Self> {
        let runs: Vec<&Run> = runs
            .into_iter()
            .filter(|r| r.is_completed() && r.validate().is_ok())
            .collect();

        let first = runs.first()?;
        let mut summary = Self {
            run_count: 0,
            total_distance_km: 0.0,
            total_duration_secs: 0,
            average_distance_km: 0.0,
            average_pace_secs_per_km: 0.0,
            best_pace_secs_per_km: f64::INFINITY,
            longest_run_km: 0.0,
            runs_per_week: 0.0,
            first_run: first.date,
            last_run: first.date,
        };

        // Durations are only bounded below, so the exact total may not fit in u64.
        let mut total_duration = 0.0;
        for run in &runs {
            summary.run_count += 1;
            summary.total_distance_km += run.distance_km;
            summary.total_duration_secs = summary.total_duration_secs.saturating_add(run.duration_secs);
            total_duration += run.duration_secs as f64;
            summary.best_pace_secs_per_km = summary.best_pace_secs_per_km.min(run.pace_secs_per_km());
            summary.longest_run_km = summary.longest_run_km.max(run.distance_km);
            summary.first_run = summary.first_run.min(run.date);
            summary.last_run = summary.last_run.max(run.date);
        }

        summary.average_distance_km = summary.total_distance_km / summary.run_count as f64;
        summary.average_pace_secs_per_km = total_duration / summary.total_distance_km;

        let span_days = (summary.last_run - summary.first_run).num_days() as f64;
        let weeks = (span_days / 7.0).max(1.0);
        summary.runs_per_week = summary.run_count as f64 / weeks;

        Some(summary)
    }
}
