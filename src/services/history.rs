use std::sync::Arc;

use serde::Serialize;
use tracing::instrument;

use crate::{
    db::DataStore,
    models::{ContentItem, HistoryEntry, ProgressPatch},
    services::feedback::Feedback,
    session::UserSession,
};

/// Progress at or above this percentage is always written
const NEAR_END_PERCENT: u8 = 95;
/// Below the near-end mark, only multiples of this are written
const WRITE_STEP_PERCENT: u8 = 10;

/// Rounded percentage watched, or `None` when the duration is unknown
pub fn progress_percent(current_seconds: f64, duration_seconds: f64) -> Option<u8> {
    if !duration_seconds.is_finite() || duration_seconds <= 0.0 || !current_seconds.is_finite() {
        return None;
    }
    let percent = (current_seconds / duration_seconds * 100.0).round();
    Some(percent.clamp(0.0, 100.0) as u8)
}

/// Minutes watched, with the position capped at the duration
pub fn watched_minutes(current_seconds: f64, duration_seconds: f64) -> u32 {
    let position = current_seconds.clamp(0.0, duration_seconds);
    (position / 60.0).round() as u32
}

/// Throttle for continuous playback: bounds store writes to roughly a dozen per title
pub fn should_persist(progress: u8) -> bool {
    progress % WRITE_STEP_PERCENT == 0 || progress >= NEAR_END_PERCENT
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(tag = "status", content = "progress", rename_all = "snake_case")]
pub enum ProgressOutcome {
    /// No session held or duration unknown; nothing computed
    Ignored,
    /// Computed but not written
    Throttled(u8),
    Saved(u8),
    /// Write failed; logged and swallowed
    Failed(u8),
}

/// Best-effort playback history. Store failures are logged and never
/// interrupt playback.
#[derive(Clone)]
pub struct HistoryTracker {
    store: Arc<dyn DataStore>,
}

impl HistoryTracker {
    pub fn new(store: Arc<dyn DataStore>) -> Self {
        Self { store }
    }

    /// Playback start: upserts the row with progress reset to 0 and moves it
    /// to the front of the mirror. Returns whether the store accepted it.
    #[instrument(skip_all, fields(user_id = %session.user_id(), content_id = %item.id))]
    pub async fn record_view(&self, session: &UserSession, item: &ContentItem) -> bool {
        let entry = HistoryEntry::started(session.user_id(), item);

        if let Err(e) = self.store.upsert_history_entry(&entry).await {
            tracing::error!(error = %e, "Failed to record view");
            return false;
        }

        session.history().write().await.record(entry);
        tracing::debug!("View recorded");
        true
    }

    /// Playback tick. Writes progress, watched minutes and timestamp when
    /// [`should_persist`] allows; a confirmed write also refreshes the mirror.
    pub async fn update_progress(
        &self,
        session: &UserSession,
        item: &ContentItem,
        current_seconds: f64,
        duration_seconds: f64,
    ) -> ProgressOutcome {
        let Some(progress) = progress_percent(current_seconds, duration_seconds) else {
            return ProgressOutcome::Ignored;
        };

        if !should_persist(progress) {
            return ProgressOutcome::Throttled(progress);
        }

        let watched_minutes = watched_minutes(current_seconds, duration_seconds);
        let patch = ProgressPatch::progress(progress, watched_minutes);

        match self
            .store
            .update_history_progress(session.user_id(), item.id, &patch)
            .await
        {
            Ok(()) => {
                session.history().write().await.apply(item.id, &patch);
                tracing::debug!(
                    user_id = %session.user_id(),
                    content_id = %item.id,
                    progress,
                    "Progress saved"
                );
                ProgressOutcome::Saved(progress)
            }
            Err(e) => {
                tracing::error!(
                    user_id = %session.user_id(),
                    content_id = %item.id,
                    error = %e,
                    "Failed to save progress"
                );
                ProgressOutcome::Failed(progress)
            }
        }
    }

    /// Playback end: progress 100 and the completed flag
    #[instrument(skip_all, fields(user_id = %session.user_id(), content_id = %item.id))]
    pub async fn mark_completed(
        &self,
        session: &UserSession,
        item: &ContentItem,
        feedback: &mut Feedback,
    ) -> bool {
        let patch = ProgressPatch::completed();

        if let Err(e) = self
            .store
            .update_history_progress(session.user_id(), item.id, &patch)
            .await
        {
            tracing::error!(error = %e, "Failed to mark as completed");
            return false;
        }

        session.history().write().await.apply(item.id, &patch);
        feedback.success("Content completed!");
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{MemoryStore, MockDataStore};
    use crate::error::AppError;
    use crate::models::{ContentId, HistoryMirror, Session, User, WatchlistMirror};
    use crate::services::catalog::Catalog;
    use uuid::Uuid;

    fn user_session() -> UserSession {
        UserSession::new(
            Session {
                access_token: "t".to_string(),
                user: User {
                    id: Uuid::new_v4(),
                    email: None,
                },
            },
            WatchlistMirror::default(),
            HistoryMirror::default(),
        )
    }

    fn content(id: i64) -> ContentItem {
        Catalog::demo().get(ContentId(id)).cloned().unwrap()
    }

    #[test]
    fn test_progress_percent_rounds() {
        assert_eq!(progress_percent(15.0, 100.0), Some(15));
        assert_eq!(progress_percent(29.6, 100.0), Some(30));
        assert_eq!(progress_percent(120.0, 100.0), Some(100));
        assert_eq!(progress_percent(10.0, 0.0), None);
        assert_eq!(progress_percent(10.0, f64::NAN), None);
    }

    #[test]
    fn test_watched_minutes_capped_at_duration() {
        assert_eq!(watched_minutes(1_800.0, 3_600.0), 30);
        assert_eq!(watched_minutes(1.0e15, 3_600.0), 60);
        assert_eq!(watched_minutes(-30.0, 3_600.0), 0);
    }

    #[tokio::test]
    async fn test_overshooting_position_writes_duration_minutes() {
        let mut store = MockDataStore::new();
        store
            .expect_update_history_progress()
            .withf(|_, _, patch| {
                patch.progress_percent == 100 && patch.watched_minutes == Some(120)
            })
            .times(1)
            .returning(|_, _, _| Ok(()));
        let tracker = HistoryTracker::new(Arc::new(store));

        let outcome = tracker
            .update_progress(&user_session(), &content(1), 1.0e15, 7_200.0)
            .await;
        assert_eq!(outcome, ProgressOutcome::Saved(100));
    }

    #[test]
    fn test_should_persist_rule() {
        assert!(!should_persist(15));
        assert!(should_persist(30));
        assert!(should_persist(0));
        assert!(!should_persist(94));
        assert!(should_persist(95));
        assert!(should_persist(96));
        assert!(should_persist(100));
    }

    #[tokio::test]
    async fn test_throttled_progress_issues_no_write() {
        let mut store = MockDataStore::new();
        store.expect_update_history_progress().never();
        let tracker = HistoryTracker::new(Arc::new(store));
        let session = user_session();

        let outcome = tracker
            .update_progress(&session, &content(1), 15.0, 100.0)
            .await;
        assert_eq!(outcome, ProgressOutcome::Throttled(15));
    }

    #[tokio::test]
    async fn test_progress_writes_on_step_and_near_end() {
        let mut store = MockDataStore::new();
        store
            .expect_update_history_progress()
            .withf(|_, id, patch| *id == ContentId(1) && patch.progress_percent == 30)
            .times(1)
            .returning(|_, _, _| Ok(()));
        store
            .expect_update_history_progress()
            .withf(|_, _, patch| patch.progress_percent == 96)
            .times(1)
            .returning(|_, _, _| Ok(()));
        let tracker = HistoryTracker::new(Arc::new(store));
        let session = user_session();
        let item = content(1);

        assert_eq!(
            tracker.update_progress(&session, &item, 30.0, 100.0).await,
            ProgressOutcome::Saved(30)
        );
        assert_eq!(
            tracker.update_progress(&session, &item, 96.0, 100.0).await,
            ProgressOutcome::Saved(96)
        );
    }

    #[tokio::test]
    async fn test_progress_failure_is_swallowed() {
        let mut store = MockDataStore::new();
        store
            .expect_update_history_progress()
            .returning(|_, _, _| Err(AppError::Store("offline".to_string())));
        let tracker = HistoryTracker::new(Arc::new(store));

        let outcome = tracker
            .update_progress(&user_session(), &content(2), 50.0, 100.0)
            .await;
        assert_eq!(outcome, ProgressOutcome::Failed(50));
    }

    #[tokio::test]
    async fn test_record_view_orders_most_recent_first() {
        let store = Arc::new(MemoryStore::new());
        let tracker = HistoryTracker::new(store.clone());
        let session = user_session();

        assert!(tracker.record_view(&session, &content(1)).await);
        assert!(tracker.record_view(&session, &content(5)).await);

        let history = session.history().read().await;
        assert_eq!(history.entries()[0].content_id, ContentId(5));
        assert_eq!(history.entries()[1].content_id, ContentId(1));
        assert_eq!(store.list_history(session.user_id()).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_record_view_resets_progress() {
        let store = Arc::new(MemoryStore::new());
        let tracker = HistoryTracker::new(store.clone());
        let session = user_session();
        let item = content(3);

        tracker.record_view(&session, &item).await;
        tracker.update_progress(&session, &item, 40.0, 100.0).await;
        assert_eq!(
            session.history().read().await.get(item.id).unwrap().progress_percent,
            40
        );

        tracker.record_view(&session, &item).await;
        let history = session.history().read().await;
        assert_eq!(history.entries().len(), 1);
        assert_eq!(history.get(item.id).unwrap().progress_percent, 0);
    }

    #[tokio::test]
    async fn test_record_view_failure_leaves_mirror() {
        let mut store = MockDataStore::new();
        store
            .expect_upsert_history_entry()
            .returning(|_| Err(AppError::Store("offline".to_string())));
        let tracker = HistoryTracker::new(Arc::new(store));
        let session = user_session();

        assert!(!tracker.record_view(&session, &content(1)).await);
        assert!(session.history().read().await.is_empty());
    }

    #[tokio::test]
    async fn test_mark_completed_sets_flag_and_notifies() {
        let store = Arc::new(MemoryStore::new());
        let tracker = HistoryTracker::new(store.clone());
        let session = user_session();
        let item = content(7);

        tracker.record_view(&session, &item).await;
        let mut feedback = Feedback::new();
        assert!(tracker.mark_completed(&session, &item, &mut feedback).await);

        let rows = store.list_history(session.user_id()).await.unwrap();
        assert_eq!(rows[0].progress_percent, 100);
        assert!(rows[0].completed);
        assert!(session.history().read().await.get(item.id).unwrap().completed);
        assert_eq!(feedback.notifications[0].message, "Content completed!");
    }

    #[tokio::test]
    async fn test_mark_completed_failure_is_silent() {
        let mut store = MockDataStore::new();
        store
            .expect_update_history_progress()
            .returning(|_, _, _| Err(AppError::Store("offline".to_string())));
        let tracker = HistoryTracker::new(Arc::new(store));

        let mut feedback = Feedback::new();
        assert!(
            !tracker
                .mark_completed(&user_session(), &content(7), &mut feedback)
                .await
        );
        assert!(feedback.is_empty());
    }
}
