// mod.rs — Subcommands and the glue that drives the goal engine.

pub mod goal;
pub mod run;
pub mod stats;

use std::sync::Arc;

use runlog_engine::{CompletionNotifier, GoalGenerationController, TrailingWindowCalculator};
use runlog_goal::{
    GoalError, JsonGoalStore, JsonRunStore, LogSink, Notification, NotificationDispatcher,
    NotificationSink, PersistedGoal,
};

use crate::config::RunlogConfig;

/// Prints notifications to stdout.
pub struct ConsoleSink;

impl NotificationSink for ConsoleSink {
    fn show(&self, notification: &Notification) -> Result<(), GoalError> {
        println!();
        println!("{}", notification.title);
        println!("  {}", notification.body);
        Ok(())
    }
}

/// One activation of the goal engine for `user`.
///
/// Each CLI invocation is its own activation scope, so only the automatic
/// path is needed here. Returns the persisted goal if one was generated and
/// saved.
pub fn check_for_goal(config: &RunlogConfig, user: &str) -> anyhow::Result<Option<PersistedGoal>> {
    let engine = config.engine()?;
    let runs = JsonRunStore::new(&config.runs_dir)?.list_for_user(user)?;
    let goal_store = Arc::new(JsonGoalStore::new(&config.goals_dir)?);
    let goals = goal_store.list_for_user(user)?;

    let mut controller = GoalGenerationController::new(TrailingWindowCalculator::new(engine.clone())?);
    let Some(goal) = controller.on_activate(user, &runs, &goals) else {
        return Ok(None);
    };

    let sink = NotificationDispatcher::new()
        .with_sink(Box::new(ConsoleSink))
        .with_sink(Box::new(LogSink::new(&config.events_log)));

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async {
        let mut notifier = CompletionNotifier::new(goal_store, Arc::new(sink))
            .with_visible_for(engine.notification_visible_for());
        let persisted = notifier.handle_generated(&goal).await;
        // The process is about to exit; nothing is left to dismiss.
        notifier.shutdown();
        Ok::<_, anyhow::Error>(Some(persisted?))
    })
}
