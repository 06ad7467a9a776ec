// stats.rs — Performance summary for the current user.

use runlog_engine::format::{format_date, format_distance, format_duration, format_pace};
use runlog_engine::PerformanceSummary;
use runlog_goal::{GoalStatus, JsonGoalStore, JsonRunStore};

use crate::config::RunlogConfig;

pub fn execute(config: &RunlogConfig, user: &str) -> anyhow::Result<()> {
    let runs = JsonRunStore::new(&config.runs_dir)?.list_for_user(user)?;
    let goals = JsonGoalStore::new(&config.goals_dir)?.list_by_status(user, GoalStatus::Active)?;

    let Some(summary) = PerformanceSummary::from_runs(&runs) else {
        println!("No completed runs yet.");
        return Ok(());
    };
    print_summary(&summary);

    match goals.first() {
        Some(goal) => {
            println!();
            println!("Current goal: {}", goal.id);
            println!(
                "  {} km at {}/km by {}",
                format_distance(goal.target_distance_km),
                format_pace(goal.target_pace_secs_per_km),
                format_date(&goal.target_date)
            );
        }
        None => println!("\nNo active goal."),
    }
    Ok(())
}

fn print_summary(s: &PerformanceSummary) {
    println!("Runs:          {}", s.run_count);
    println!("Total:         {} km in {}", format_distance(s.total_distance_km), format_duration(s.total_duration_secs));
    println!("Average run:   {} km", format_distance(s.average_distance_km));
    println!("Average pace:  {}/km", format_pace(s.average_pace_secs_per_km));
    println!("Best pace:     {}/km", format_pace(s.best_pace_secs_per_km));
    println!("Longest run:   {} km", format_distance(s.longest_run_km));
    println!("Per week:      {:.1}", s.runs_per_week);
    println!("Since:         {}", format_date(&s.first_run));
    println!("Last run:      {}", format_date(&s.last_run));
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use runlog_goal::Run;
    use tempfile::TempDir;

    #[test]
    fn stats_on_empty_project() {
        let project = TempDir::new().unwrap();
        let config = RunlogConfig::for_project(project.path());
        execute(&config, "user-1").unwrap();
    }

    #[test]
    fn stats_with_runs_and_goal() {
        let project = TempDir::new().unwrap();
        let config = RunlogConfig::for_project(project.path());
        JsonRunStore::new(&config.runs_dir)
            .unwrap()
            .add(&Run::new("user-1", Utc::now(), 10.0, 3300))
            .unwrap();
        crate::commands::check_for_goal(&config, "user-1").unwrap();
        execute(&config, "user-1").unwrap();
    }
}
