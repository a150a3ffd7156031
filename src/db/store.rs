use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{ContentId, HistoryEntry, ProgressPatch, UserProfile, WatchlistEntry},
};

/// Table-like access to the three collections the page consumes:
/// user profiles, watchlist entries and history entries.
///
/// Every row is keyed by the owning user; watchlist and history rows are
/// unique per (user, content).
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DataStore: Send + Sync {
    async fn find_profile(&self, user_id: Uuid) -> AppResult<Option<UserProfile>>;

    async fn insert_profile(&self, profile: &UserProfile) -> AppResult<()>;

    async fn list_watchlist(&self, user_id: Uuid) -> AppResult<Vec<WatchlistEntry>>;

    async fn insert_watchlist_entry(&self, entry: &WatchlistEntry) -> AppResult<()>;

    async fn delete_watchlist_entry(&self, user_id: Uuid, content_id: ContentId)
        -> AppResult<()>;

    /// History rows, most recently watched first
    async fn list_history(&self, user_id: Uuid) -> AppResult<Vec<HistoryEntry>>;

    /// Inserts or replaces the row for (user, content)
    async fn upsert_history_entry(&self, entry: &HistoryEntry) -> AppResult<()>;

    async fn update_history_progress(
        &self,
        user_id: Uuid,
        content_id: ContentId,
        patch: &ProgressPatch,
    ) -> AppResult<()>;

    /// Backend name for logging
    fn name(&self) -> &'static str;
}
