//! # runlog-cli
//!
//! Command-line interface for Runlog.
//!
//! - `runlog run add/list` — log runs and browse the run history
//! - `runlog goal list/status/generate/complete/abandon` — manage goals
//! - `runlog stats` — aggregate performance over completed runs
//!
//! Logging a completed run activates the goal engine once; if the runner has
//! no active goal, a new stretch goal is generated, saved, and announced.

mod commands;
mod config;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::config::RunlogConfig;

/// Runlog — a personal running log with automatic goals.
#[derive(Parser)]
#[command(name = "runlog", version, about)]
struct Cli {
    /// Project root directory holding `.runlog/` (defaults to current directory).
    #[arg(long, default_value = ".")]
    project_root: PathBuf,

    /// Runner identity.
    #[arg(long, default_value = "user-1")]
    user: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log and list runs.
    Run {
        #[command(subcommand)]
        command: commands::run::RunCommands,
    },
    /// Manage goals.
    Goal {
        #[command(subcommand)]
        command: commands::goal::GoalCommands,
    },
    /// Show aggregate performance.
    Stats,
}

fn main() -> anyhow::Result<()> {
    // Logs go to stderr so they don't interfere with command output on stdout.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("runlog_engine=info".parse()?)
                .add_directive("runlog_goal=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let cli = Cli::parse();
    let project_root = cli.project_root.canonicalize().unwrap_or(cli.project_root);
    let config = RunlogConfig::for_project(&project_root);

    match &cli.command {
        Commands::Run { command } => commands::run::execute(command, &config, &cli.user),
        Commands::Goal { command } => commands::goal::execute(command, &config, &cli.user),
        Commands::Stats => commands::stats::execute(&config, &cli.user),
    }
}
