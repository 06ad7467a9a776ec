// goal.rs — Goal subcommands: list, status, generate, complete, abandon.

use clap::Subcommand;
use runlog_engine::format::{format_date, format_distance, format_duration, format_pace};
use runlog_goal::{Goal, GoalStatus, JsonGoalStore};
use uuid::Uuid;

use crate::config::RunlogConfig;

#[derive(Subcommand)]
pub enum GoalCommands {
    /// List goals, newest first.
    List {
        /// Filter by status (active, completed, abandoned).
        #[arg(long)]
        status: Option<String>,
    },
    /// Show details for a specific goal.
    Status {
        /// Goal ID.
        id: String,
    },
    /// Check whether a new goal should be generated now.
    ///
    /// Every invocation is a fresh activation, so this succeeds whenever the
    /// runner has completed runs and no active goal.
    Generate,
    /// Mark the goal as reached.
    Complete {
        /// Goal ID.
        id: String,
    },
    /// Give up on the goal.
    Abandon {
        /// Goal ID.
        id: String,
    },
}

pub fn execute(cmd: &GoalCommands, config: &RunlogConfig, user: &str) -> anyhow::Result<()> {
    let store = JsonGoalStore::new(&config.goals_dir)?;

    match cmd {
        GoalCommands::List { status } => list_goals(&store, user, status.as_deref()),
        GoalCommands::Status { id } => show_status(&store, id),
        GoalCommands::Generate => generate(config, user),
        GoalCommands::Complete { id } => transition(&store, id, GoalStatus::Completed),
        GoalCommands::Abandon { id } => transition(&store, id, GoalStatus::Abandoned),
    }
}

fn list_goals(store: &JsonGoalStore, user: &str, status: Option<&str>) -> anyhow::Result<()> {
    let goals = match status {
        Some(s) => {
            let status: GoalStatus = s.parse().map_err(anyhow::Error::msg)?;
            store.list_by_status(user, status)?
        }
        None => store.list_for_user(user)?,
    };

    if goals.is_empty() {
        println!("No goals found.");
        return Ok(());
    }

    println!(
        "{:<38} {:>8} {:>8} {:<12} {:<10} {:<5}",
        "ID", "KM", "PACE", "BY", "STATUS", "AUTO"
    );
    println!("{}", "-".repeat(86));

    for g in &goals {
        println!(
            "{:<38} {:>8} {:>8} {:<12} {:<10} {:<5}",
            g.id,
            format_distance(g.target_distance_km),
            format_pace(g.target_pace_secs_per_km),
            format_date(&g.target_date),
            g.status.to_string(),
            if g.auto_generated { "yes" } else { "no" },
        );
    }
    println!("\n{} goal(s) total.", goals.len());

    Ok(())
}

fn find_goal(store: &JsonGoalStore, id: &str) -> anyhow::Result<Goal> {
    let goal_id = Uuid::parse_str(id)?;
    store
        .get(goal_id)?
        .ok_or_else(|| anyhow::anyhow!("Goal not found: {}", id))
}

fn show_status(store: &JsonGoalStore, id: &str) -> anyhow::Result<()> {
    let g = find_goal(store, id)?;
    println!("Goal:     {}", g.id);
    println!("Status:   {}", g.status);
    println!("Distance: {} km", format_distance(g.target_distance_km));
    println!("Pace:     {}/km", format_pace(g.target_pace_secs_per_km));
    println!("Time:     {}", format_duration(g.target_duration_secs().round() as u64));
    println!("By:       {}", format_date(&g.target_date));
    if g.auto_generated {
        println!("Source:   generated from {} run(s)", g.based_on_runs);
    }
    println!("Created:  {}", g.created_at.to_rfc3339());
    println!("Updated:  {}", g.updated_at.to_rfc3339());
    Ok(())
}

fn generate(config: &RunlogConfig, user: &str) -> anyhow::Result<()> {
    if super::check_for_goal(config, user)?.is_none() {
        println!("No new goal generated.");
    }
    Ok(())
}

fn transition(store: &JsonGoalStore, id: &str, status: GoalStatus) -> anyhow::Result<()> {
    let goal_id = Uuid::parse_str(id)?;
    let goal = store.transition(goal_id, status)?;
    println!("Goal {} is now {}.", goal.id, goal.status);
    Ok(())
}
