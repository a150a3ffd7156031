use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    db::DataStore,
    error::AppResult,
    models::{ContentId, HistoryEntry, ProgressPatch, UserProfile, WatchlistEntry},
};

type RowKey = (Uuid, ContentId);

#[derive(Default)]
struct Tables {
    profiles: HashMap<Uuid, UserProfile>,
    watchlist: HashMap<RowKey, WatchlistEntry>,
    history: HashMap<RowKey, HistoryEntry>,
}

/// Process-local store for development and tests
///
/// Enforces the same uniqueness as the Postgres schema: inserting an
/// existing watchlist key or profile id fails.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DataStore for MemoryStore {
    async fn find_profile(&self, user_id: Uuid) -> AppResult<Option<UserProfile>> {
        Ok(self.tables.read().await.profiles.get(&user_id).cloned())
    }

    async fn insert_profile(&self, profile: &UserProfile) -> AppResult<()> {
        let mut tables = self.tables.write().await;
        if tables.profiles.contains_key(&profile.id) {
            return Err(crate::error::AppError::Store(format!(
                "duplicate profile {}",
                profile.id
            )));
        }
        tables.profiles.insert(profile.id, profile.clone());
        Ok(())
    }

    async fn list_watchlist(&self, user_id: Uuid) -> AppResult<Vec<WatchlistEntry>> {
        let tables = self.tables.read().await;
        let mut entries: Vec<WatchlistEntry> = tables
            .watchlist
            .values()
            .filter(|e| e.user_id == user_id)
            .cloned()
            .collect();
        entries.sort_by_key(|e| e.added_at);
        Ok(entries)
    }

    async fn insert_watchlist_entry(&self, entry: &WatchlistEntry) -> AppResult<()> {
        let mut tables = self.tables.write().await;
        let key = (entry.user_id, entry.content_id);
        if tables.watchlist.contains_key(&key) {
            return Err(crate::error::AppError::Store(format!(
                "duplicate watchlist entry for content {}",
                entry.content_id
            )));
        }
        tables.watchlist.insert(key, entry.clone());
        Ok(())
    }

    async fn delete_watchlist_entry(
        &self,
        user_id: Uuid,
        content_id: ContentId,
    ) -> AppResult<()> {
        self.tables
            .write()
            .await
            .watchlist
            .remove(&(user_id, content_id));
        Ok(())
    }

    async fn list_history(&self, user_id: Uuid) -> AppResult<Vec<HistoryEntry>> {
        let tables = self.tables.read().await;
        let mut entries: Vec<HistoryEntry> = tables
            .history
            .values()
            .filter(|e| e.user_id == user_id)
            .cloned()
            .collect();
        entries.sort_by(|a, b| b.watched_at.cmp(&a.watched_at));
        Ok(entries)
    }

    async fn upsert_history_entry(&self, entry: &HistoryEntry) -> AppResult<()> {
        self.tables
            .write()
            .await
            .history
            .insert((entry.user_id, entry.content_id), entry.clone());
        Ok(())
    }

    async fn update_history_progress(
        &self,
        user_id: Uuid,
        content_id: ContentId,
        patch: &ProgressPatch,
    ) -> AppResult<()> {
        // Matches an UPDATE with no matching row: nothing happens
        if let Some(entry) = self
            .tables
            .write()
            .await
            .history
            .get_mut(&(user_id, content_id))
        {
            entry.apply(patch);
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
