// notify.rs — User-facing notifications and the sinks that display them.
//
// A notification is fire-and-forget: sinks may fail, and failures are logged
// but never reach the code that raised the notification. Sinks that can hide
// a notification again (a toast area, an alert banner) implement `dismiss`.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::GoalError;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// A new goal was generated and saved.
    GoalCreated,
    /// Saving a generated goal failed.
    GoalFailed,
}

/// A message shown to the runner.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Notification {
    pub id: Uuid,
    pub kind: NotificationKind,
    pub title: String,
    pub body: String,
    /// The goal this notification is about, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goal_id: Option<Uuid>,
    pub timestamp: DateTime<Utc>,
}

impl Notification {
    pub fn new(kind: NotificationKind, title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            title: title.into(),
            body: body.into(),
            goal_id: None,
            timestamp: Utc::now(),
        }
    }

    pub fn for_goal(mut self, goal_id: Uuid) -> Self {
        self.goal_id = Some(goal_id);
        self
    }
}

/// Receives notifications for display.
pub trait NotificationSink: Send + Sync {
    /// Display a notification. Errors are logged by the caller, never retried.
    fn show(&self, notification: &Notification) -> Result<(), GoalError>;

    /// Hide a previously shown notification. Sinks without a visible
    /// surface ignore this.
    fn dismiss(&self, _notification_id: Uuid) -> Result<(), GoalError> {
        Ok(())
    }
}

/// Appends notifications as JSONL to a file (always-on sink).
pub struct LogSink {
    path: PathBuf,
}

impl LogSink {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl NotificationSink for LogSink {
    fn show(&self, notification: &Notification) -> Result<(), GoalError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|source| GoalError::IoError {
                path: parent.display().to_string(),
                source,
            })?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|source| GoalError::IoError {
                path: self.path.display().to_string(),
                source,
            })?;

        let json = serde_json::to_string(notification)?;
        writeln!(file, "{}", json).map_err(|source| GoalError::IoError {
            path: self.path.display().to_string(),
            source,
        })?;

        Ok(())
    }
}

/// Fans notifications out to several sinks.
///
/// A failing sink is logged and skipped; the others still receive the
/// notification, and the dispatcher itself never reports failure.
pub struct NotificationDispatcher {
    sinks: Vec<Box<dyn NotificationSink>>,
}

impl NotificationDispatcher {
    pub fn new() -> Self {
        Self { sinks: Vec::new() }
    }

    pub fn add_sink(&mut self, sink: Box<dyn NotificationSink>) {
        self.sinks.push(sink);
    }

    pub fn with_sink(mut self, sink: Box<dyn NotificationSink>) -> Self {
        self.add_sink(sink);
        self
    }
}

impl Default for NotificationDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationSink for NotificationDispatcher {
    fn show(&self, notification: &Notification) -> Result<(), GoalError> {
        for sink in &self.sinks {
            if let Err(e) = sink.show(notification) {
                tracing::warn!("notification sink error: {}", e);
            }
        }
        Ok(())
    }

    fn dismiss(&self, notification_id: Uuid) -> Result<(), GoalError> {
        for sink in &self.sinks {
            if let Err(e) = sink.dismiss(notification_id) {
                tracing::warn!("notification sink error on dismiss: {}", e);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use tempfile::tempdir;

    struct FailingSink;

    impl NotificationSink for FailingSink {
        fn show(&self, _notification: &Notification) -> Result<(), GoalError> {
            Err(GoalError::NotificationError("display unavailable".into()))
        }
    }

    #[derive(Clone, Default)]
    struct Recording(Arc<Mutex<Vec<String>>>);

    impl NotificationSink for Recording {
        fn show(&self, notification: &Notification) -> Result<(), GoalError> {
            self.0.lock().unwrap().push(format!("show:{}", notification.title));
            Ok(())
        }

        fn dismiss(&self, _notification_id: Uuid) -> Result<(), GoalError> {
            self.0.lock().unwrap().push("dismiss".to_string());
            Ok(())
        }
    }

    fn sample() -> Notification {
        Notification::new(NotificationKind::GoalCreated, "New goal created!", "5.50km")
    }

    #[test]
    fn log_sink_appends_to_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("events.jsonl");
        let sink = LogSink::new(&path);

        sink.show(&sample()).unwrap();
        sink.show(&sample()).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 2);
        assert!(content.contains("\"goal_created\""));
    }

    #[test]
    fn dispatcher_skips_failing_sinks() {
        let recording = Recording::default();
        let dispatcher = NotificationDispatcher::new()
            .with_sink(Box::new(FailingSink))
            .with_sink(Box::new(recording.clone()));

        dispatcher.show(&sample()).unwrap();
        dispatcher.dismiss(Uuid::new_v4()).unwrap();

        let seen = recording.0.lock().unwrap().clone();
        assert_eq!(seen, vec!["show:New goal created!".to_string(), "dismiss".to_string()]);
    }

    #[test]
    fn goal_id_omitted_when_absent() {
        let json = serde_json::to_string(&sample()).unwrap();
        assert!(!json.contains("goal_id"));

        let id = Uuid::new_v4();
        let json = serde_json::to_string(&sample().for_goal(id)).unwrap();
        assert!(json.contains(&id.to_string()));
    }
}
