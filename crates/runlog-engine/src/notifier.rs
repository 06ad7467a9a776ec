// notifier.rs — CompletionNotifier: persist a generated goal once, announce it.
//
// Ordering for a new goal: the store write is awaited first, then the
// notification is shown, then a dismissal timer is started. A goal whose
// identity was already persisted is a silent no-op. A failed write shows a
// failure notification and leaves the dedup state untouched so the same goal
// can be retried.
//
// The dismissal timer is the only cancellable piece. When a newer
// notification replaces it, the older notification is dismissed right away so
// no notification outlives its window. `shutdown` and drop abort it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use runlog_goal::{
    Goal, GoalError, GoalStore, Notification, NotificationKind, NotificationSink, PersistedGoal,
};
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::format::{format_date, format_distance, format_pace};

const DEFAULT_VISIBLE_FOR: Duration = Duration::from_secs(10);

/// Called with every newly persisted goal.
pub type SavedCallback = Box<dyn FnMut(&PersistedGoal) + Send>;

pub struct CompletionNotifier {
    store: Arc<dyn GoalStore>,
    sink: Arc<dyn NotificationSink>,
    visible_for: Duration,
    last_persisted: Option<PersistedGoal>,
    on_saved: Option<SavedCallback>,
    showing: Arc<AtomicBool>,
    /// Pending dismissal: the notification it hides and the timer task.
    dismiss_timer: Option<(Uuid, JoinHandle<()>)>,
}

impl CompletionNotifier {
    pub fn new(store: Arc<dyn GoalStore>, sink: Arc<dyn NotificationSink>) -> Self {
        Self {
            store,
            sink,
            visible_for: DEFAULT_VISIBLE_FOR,
            last_persisted: None,
            on_saved: None,
            showing: Arc::new(AtomicBool::new(false)),
            dismiss_timer: None,
        }
    }

    /// How long a goal-created notification stays up before auto-dismissal.
    pub fn with_visible_for(mut self, visible_for: Duration) -> Self {
        self.visible_for = visible_for;
        self
    }

    pub fn on_saved(mut self, callback: impl FnMut(&PersistedGoal) + Send + 'static) -> Self {
        self.on_saved = Some(Box::new(callback));
        self
    }

    /// Persist and announce a generated goal, once per goal identity.
    ///
    /// Must run inside a tokio runtime (the dismissal timer is a spawned task).
    pub async fn handle_generated(&mut self, goal: &Goal) -> Result<PersistedGoal, GoalError> {
        if let Some(previous) = &self.last_persisted {
            if previous.id() == goal.id {
                tracing::debug!(goal_id = %goal.id, "goal already persisted, skipping");
                return Ok(previous.clone());
            }
        }

        let persisted = match self.store.save(goal).await {
            Ok(persisted) => persisted,
            Err(e) => {
                tracing::warn!(goal_id = %goal.id, "failed to save generated goal: {}", e);
                self.show(
                    &Notification::new(
                        NotificationKind::GoalFailed,
                        "Failed to create goal",
                        "There was a problem creating your new goal. Please try again.",
                    )
                    .for_goal(goal.id),
                );
                return Err(e);
            }
        };

        // Dedup on the identity that was handed in, so a store that rewrites
        // ids cannot defeat it.
        let mut remembered = persisted.clone();
        remembered.goal.id = goal.id;
        self.last_persisted = Some(remembered);
        tracing::info!(goal_id = %goal.id, "generated goal persisted");

        if let Some(callback) = self.on_saved.as_mut() {
            callback(&persisted);
        }

        let notification = goal_created_notification(&persisted.goal);
        self.show(&notification);
        self.showing.store(true, Ordering::SeqCst);
        self.schedule_dismissal(notification.id);

        Ok(persisted)
    }

    fn show(&self, notification: &Notification) {
        if let Err(e) = self.sink.show(notification) {
            tracing::warn!("notification sink error: {}", e);
        }
    }

    fn schedule_dismissal(&mut self, notification_id: Uuid) {
        if let Some((previous_id, timer)) = self.dismiss_timer.take() {
            // A finished timer already dismissed its notification.
            if !timer.is_finished() {
                timer.abort();
                if let Err(e) = self.sink.dismiss(previous_id) {
                    tracing::warn!("notification sink error on dismiss: {}", e);
                }
            }
        }

        let sink = Arc::clone(&self.sink);
        let showing = Arc::clone(&self.showing);
        let visible_for = self.visible_for;
        let timer = tokio::spawn(async move {
            tokio::time::sleep(visible_for).await;
            showing.store(false, Ordering::SeqCst);
            if let Err(e) = sink.dismiss(notification_id) {
                tracing::warn!("notification sink error on dismiss: {}", e);
            }
        });
        self.dismiss_timer = Some((notification_id, timer));
    }

    fn cancel_dismissal(&mut self) {
        if let Some((_, timer)) = self.dismiss_timer.take() {
            timer.abort();
        }
    }

    /// Whether the goal-created notification is still within its window.
    pub fn is_showing(&self) -> bool {
        self.showing.load(Ordering::SeqCst)
    }

    pub fn last_persisted(&self) -> Option<&PersistedGoal> {
        self.last_persisted.as_ref()
    }

    /// Tear down: cancel the pending dismissal and hide the notification.
    pub fn shutdown(&mut self) {
        self.cancel_dismissal();
        self.showing.store(false, Ordering::SeqCst);
    }
}

impl Drop for CompletionNotifier {
    fn drop(&mut self) {
        self.cancel_dismissal();
    }
}

fn goal_created_notification(goal: &Goal) -> Notification {
    Notification::new(
        NotificationKind::GoalCreated,
        "New goal created!",
        format!(
            "We've set a new target for you: {}km at a pace of {}/km by {}.",
            format_distance(goal.target_distance_km),
            format_pace(goal.target_pace_secs_per_km),
            format_date(&goal.target_date),
        ),
    )
    .for_goal(goal.id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use std::sync::Mutex;

    /// In-memory store; fails the first `fail_times` saves.
    #[derive(Default)]
    struct MemoryStore {
        saves: Mutex<Vec<Goal>>,
        fail_times: Mutex<usize>,
    }

    impl MemoryStore {
        fn failing(times: usize) -> Self {
            Self {
                saves: Mutex::new(Vec::new()),
                fail_times: Mutex::new(times),
            }
        }

        fn save_count(&self) -> usize {
            self.saves.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl GoalStore for MemoryStore {
        async fn save(&self, goal: &Goal) -> Result<PersistedGoal, GoalError> {
            let mut fail = self.fail_times.lock().unwrap();
            if *fail > 0 {
                *fail -= 1;
                return Err(GoalError::StoreError("connection reset".into()));
            }
            self.saves.lock().unwrap().push(goal.clone());
            Ok(PersistedGoal {
                goal: goal.clone(),
                persisted_at: Utc::now(),
            })
        }

        async fn list(&self, user_id: &str) -> Result<Vec<Goal>, GoalError> {
            Ok(self
                .saves
                .lock()
                .unwrap()
                .iter()
                .filter(|g| g.user_id == user_id)
                .cloned()
                .collect())
        }
    }

    #[derive(Default)]
    struct RecordingSink {
        shown: Mutex<Vec<Notification>>,
        dismissed: Mutex<Vec<Uuid>>,
    }

    impl NotificationSink for RecordingSink {
        fn show(&self, notification: &Notification) -> Result<(), GoalError> {
            self.shown.lock().unwrap().push(notification.clone());
            Ok(())
        }

        fn dismiss(&self, notification_id: Uuid) -> Result<(), GoalError> {
            self.dismissed.lock().unwrap().push(notification_id);
            Ok(())
        }
    }

    fn goal() -> Goal {
        let mut g = Goal::new(
            "user-1",
            5.5,
            349.0,
            Utc.with_ymd_and_hms(2026, 11, 15, 12, 0, 0).unwrap(),
        );
        g.auto_generated = true;
        g
    }

    fn setup(store: MemoryStore) -> (Arc<MemoryStore>, Arc<RecordingSink>, CompletionNotifier) {
        let store = Arc::new(store);
        let sink = Arc::new(RecordingSink::default());
        let notifier = CompletionNotifier::new(store.clone(), sink.clone());
        (store, sink, notifier)
    }

    #[tokio::test]
    async fn persists_and_notifies_once() {
        let (store, sink, mut notifier) = setup(MemoryStore::default());
        let g = goal();

        let first = notifier.handle_generated(&g).await.unwrap();
        let second = notifier.handle_generated(&g).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(store.save_count(), 1);
        assert_eq!(sink.shown.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn notification_describes_target() {
        let (_store, sink, mut notifier) = setup(MemoryStore::default());
        let g = goal();
        notifier.handle_generated(&g).await.unwrap();

        let shown = sink.shown.lock().unwrap();
        assert_eq!(shown[0].kind, NotificationKind::GoalCreated);
        assert_eq!(shown[0].title, "New goal created!");
        assert_eq!(
            shown[0].body,
            "We've set a new target for you: 5.50km at a pace of 5:49/km by 2026-11-15."
        );
        assert_eq!(shown[0].goal_id, Some(g.id));
    }

    #[tokio::test]
    async fn distinct_goals_are_both_persisted() {
        let (store, sink, mut notifier) = setup(MemoryStore::default());
        notifier.handle_generated(&goal()).await.unwrap();
        notifier.handle_generated(&goal()).await.unwrap();
        assert_eq!(store.save_count(), 2);
        assert_eq!(sink.shown.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn failed_save_shows_failure_and_allows_retry() {
        let (store, sink, mut notifier) = setup(MemoryStore::failing(1));
        let g = goal();

        let err = notifier.handle_generated(&g).await.unwrap_err();
        assert!(matches!(err, GoalError::StoreError(_)));
        assert!(notifier.last_persisted().is_none());
        assert!(!notifier.is_showing());
        {
            let shown = sink.shown.lock().unwrap();
            assert_eq!(shown.len(), 1);
            assert_eq!(shown[0].kind, NotificationKind::GoalFailed);
            assert_eq!(shown[0].title, "Failed to create goal");
        }

        // Same identity again: treated as a fresh attempt, not a duplicate.
        notifier.handle_generated(&g).await.unwrap();
        assert_eq!(store.save_count(), 1);
        let shown = sink.shown.lock().unwrap();
        assert_eq!(shown.len(), 2);
        assert_eq!(shown[1].kind, NotificationKind::GoalCreated);
    }

    #[tokio::test]
    async fn on_saved_callback_runs_once() {
        let saved: Arc<Mutex<Vec<Uuid>>> = Arc::default();
        let record = saved.clone();
        let store = Arc::new(MemoryStore::default());
        let sink = Arc::new(RecordingSink::default());
        let mut notifier = CompletionNotifier::new(store, sink)
            .on_saved(move |p| record.lock().unwrap().push(p.id()));

        let g = goal();
        notifier.handle_generated(&g).await.unwrap();
        notifier.handle_generated(&g).await.unwrap();
        assert_eq!(*saved.lock().unwrap(), vec![g.id]);
    }

    #[tokio::test(start_paused = true)]
    async fn notification_dismissed_after_ten_seconds() {
        let (_store, sink, mut notifier) = setup(MemoryStore::default());
        notifier.handle_generated(&goal()).await.unwrap();
        assert!(notifier.is_showing());

        tokio::time::sleep(Duration::from_secs(9)).await;
        assert!(notifier.is_showing());
        assert!(sink.dismissed.lock().unwrap().is_empty());

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(!notifier.is_showing());
        let shown_id = sink.shown.lock().unwrap()[0].id;
        assert_eq!(*sink.dismissed.lock().unwrap(), vec![shown_id]);
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_cancels_pending_dismissal() {
        let (_store, sink, mut notifier) = setup(MemoryStore::default());
        notifier.handle_generated(&goal()).await.unwrap();

        notifier.shutdown();
        assert!(!notifier.is_showing());

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert!(sink.dismissed.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn drop_cancels_pending_dismissal() {
        let (_store, sink, mut notifier) = setup(MemoryStore::default());
        notifier.handle_generated(&goal()).await.unwrap();
        drop(notifier);

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert!(sink.dismissed.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn replaced_notification_is_dismissed() {
        let (_store, sink, mut notifier) = setup(MemoryStore::default());
        notifier.handle_generated(&goal()).await.unwrap();
        tokio::time::sleep(Duration::from_secs(3)).await;
        notifier.handle_generated(&goal()).await.unwrap();

        let (first, second) = {
            let shown = sink.shown.lock().unwrap();
            (shown[0].id, shown[1].id)
        };
        assert_eq!(*sink.dismissed.lock().unwrap(), vec![first]);
        assert!(notifier.is_showing());

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert!(!notifier.is_showing());
        assert_eq!(*sink.dismissed.lock().unwrap(), vec![first, second]);
    }

    #[tokio::test(start_paused = true)]
    async fn expired_notification_is_not_dismissed_twice() {
        let (_store, sink, mut notifier) = setup(MemoryStore::default());
        notifier.handle_generated(&goal()).await.unwrap();
        tokio::time::sleep(Duration::from_secs(11)).await;
        notifier.handle_generated(&goal()).await.unwrap();

        tokio::time::sleep(Duration::from_secs(11)).await;
        let shown: Vec<Uuid> = sink.shown.lock().unwrap().iter().map(|n| n.id).collect();
        assert_eq!(*sink.dismissed.lock().unwrap(), shown);
    }

    #[tokio::test(start_paused = true)]
    async fn custom_visibility_window() {
        let (_store, _sink, notifier) = setup(MemoryStore::default());
        let mut notifier = notifier.with_visible_for(Duration::from_secs(3));
        notifier.handle_generated(&goal()).await.unwrap();

        tokio::time::sleep(Duration::from_secs(4)).await;
        assert!(!notifier.is_showing());
    }
}
