// run.rs — Run subcommands: add, list.

use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, TimeZone, Utc};
use clap::Subcommand;
use runlog_engine::format::{format_distance, format_duration, format_pace, parse_duration};
use runlog_goal::{JsonRunStore, Run, RunLocation, RunStatus};

use crate::config::RunlogConfig;

#[derive(Subcommand)]
pub enum RunCommands {
    /// Log a run. Logging a completed run checks for a new goal.
    Add {
        /// Distance in kilometres.
        #[arg(long)]
        distance: f64,
        /// Elapsed time: seconds, mm:ss, or hh:mm:ss.
        #[arg(long)]
        duration: String,
        /// When the run happened: RFC 3339 or YYYY-MM-DD (defaults to now).
        #[arg(long)]
        date: Option<String>,
        /// completed, in_progress, or cancelled.
        #[arg(long, default_value = "completed")]
        status: String,
        #[arg(long)]
        notes: Option<String>,
        #[arg(long)]
        city: Option<String>,
        #[arg(long)]
        state: Option<String>,
    },
    /// List runs, newest first.
    List {
        /// Show the whole history instead of the current month.
        #[arg(long)]
        all: bool,
    },
}

pub fn execute(cmd: &RunCommands, config: &RunlogConfig, user: &str) -> anyhow::Result<()> {
    let store = JsonRunStore::new(&config.runs_dir)?;

    match cmd {
        RunCommands::Add {
            distance,
            duration,
            date,
            status,
            notes,
            city,
            state,
        } => {
            let run = build_run(
                user,
                *distance,
                duration,
                date.as_deref(),
                status,
                notes.as_deref(),
                city.as_deref(),
                state.as_deref(),
            )?;
            add_run(config, &store, run)
        }
        RunCommands::List { all } => list_runs(&store, user, *all, Utc::now()),
    }
}

#[allow(clippy::too_many_arguments)]
fn build_run(
    user: &str,
    distance: f64,
    duration: &str,
    date: Option<&str>,
    status: &str,
    notes: Option<&str>,
    city: Option<&str>,
    state: Option<&str>,
) -> anyhow::Result<Run> {
    let duration_secs = parse_duration(duration).map_err(anyhow::Error::msg)?;
    let status: RunStatus = status.parse().map_err(anyhow::Error::msg)?;
    let date = match date {
        Some(d) => parse_date(d)?,
        None => Utc::now(),
    };

    let mut run = Run::new(user, date, distance, duration_secs).with_status(status);
    if let Some(notes) = notes {
        run = run.with_notes(notes);
    }
    if city.is_some() || state.is_some() {
        run = run.with_location(RunLocation {
            city_name: city.map(str::to_string),
            state_name: state.map(str::to_string),
            ..Default::default()
        });
    }
    Ok(run)
}

fn parse_date(input: &str) -> anyhow::Result<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Ok(dt.with_timezone(&Utc));
    }
    let day = NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .map_err(|_| anyhow::anyhow!("invalid date '{}' (expected RFC 3339 or YYYY-MM-DD)", input))?;
    Ok(Utc.from_utc_datetime(&day.and_time(NaiveTime::default())))
}

fn add_run(config: &RunlogConfig, store: &JsonRunStore, run: Run) -> anyhow::Result<()> {
    store.add(&run)?;
    tracing::info!(run_id = %run.id, "run logged");

    println!("Run logged: {}", run.id);
    println!("  Distance: {} km", format_distance(run.distance_km));
    println!("  Time:     {}", format_duration(run.duration_secs));
    println!("  Pace:     {}/km", format_pace(run.pace_secs_per_km()));
    println!("  Status:   {}", run.status);

    // The run is saved; a failed goal check must not make a retry log it twice.
    if run.is_completed() {
        if let Err(e) = super::check_for_goal(config, &run.user_id) {
            tracing::warn!(run_id = %run.id, "goal check failed: {:#}", e);
        }
    }
    Ok(())
}

/// First instant of the month containing `now`.
fn month_start(now: DateTime<Utc>) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(now.year(), now.month(), 1, 0, 0, 0)
        .single()
        .unwrap_or(now)
}

fn list_runs(store: &JsonRunStore, user: &str, all: bool, now: DateTime<Utc>) -> anyhow::Result<()> {
    let runs = if all {
        store.list_for_user(user)?
    } else {
        store.list_since(user, month_start(now))?
    };

    if runs.is_empty() {
        println!("No runs found.");
        return Ok(());
    }

    println!(
        "{:<12} {:>10} {:>10} {:>8} {:<12} {:<20}",
        "DATE", "KM", "TIME", "PACE", "STATUS", "LOCATION"
    );
    println!("{}", "-".repeat(77));

    for r in &runs {
        println!(
            "{:<12} {:>10} {:>10} {:>8} {:<12} {:<20}",
            r.date.format("%Y-%m-%d"),
            format_distance(r.distance_km),
            format_duration(r.duration_secs),
            format_pace(r.pace_secs_per_km()),
            r.status.to_string(),
            r.location
                .as_ref()
                .and_then(RunLocation::display_name)
                .unwrap_or_default(),
        );
    }
    println!("\n{} run(s) total.", runs.len());

    Ok(())
}
