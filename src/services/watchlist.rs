use std::sync::Arc;

use serde::Serialize;
use tracing::instrument;

use crate::{
    db::DataStore,
    error::AppResult,
    models::WatchlistToggle,
    services::feedback::Feedback,
    session::UserSession,
};

/// Membership after a successful toggle
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Membership {
    Added,
    Removed,
}

impl Membership {
    pub fn in_watchlist(&self) -> bool {
        matches!(self, Membership::Added)
    }
}

/// Keeps the user's watchlist in the store and the session mirror in step
#[derive(Clone)]
pub struct WatchlistManager {
    store: Arc<dyn DataStore>,
}

impl WatchlistManager {
    pub fn new(store: Arc<dyn DataStore>) -> Self {
        Self { store }
    }

    /// Adds the item when it is not in the mirror, removes it otherwise.
    ///
    /// The mirror changes only after the store confirms. On failure the
    /// mirror is untouched, an error notification is queued and the error
    /// is returned. The mirror lock is not held across the store call, so
    /// overlapping toggles may both act on the same snapshot; the store
    /// decides the final state and the mirror never holds duplicates.
    #[instrument(skip_all, fields(user_id = %session.user_id(), content_id = %item.content_id))]
    pub async fn toggle(
        &self,
        session: &UserSession,
        item: WatchlistToggle,
        feedback: &mut Feedback,
    ) -> AppResult<Membership> {
        let user_id = session.user_id();
        let content_id = item.content_id;
        let present = session.watchlist().read().await.contains(content_id);

        if present {
            if let Err(e) = self.store.delete_watchlist_entry(user_id, content_id).await {
                tracing::error!(error = %e, "Failed to remove watchlist entry");
                feedback.error("Error updating your list");
                return Err(e);
            }

            session.watchlist().write().await.remove(content_id);
            feedback.info("Removed from My List");
            tracing::info!("Removed from watchlist");
            Ok(Membership::Removed)
        } else {
            let entry = item.into_entry(user_id);
            if let Err(e) = self.store.insert_watchlist_entry(&entry).await {
                tracing::error!(error = %e, "Failed to add watchlist entry");
                feedback.error("Error updating your list");
                return Err(e);
            }

            session.watchlist().write().await.insert(entry);
            feedback.success("Added to My List!");
            tracing::info!("Added to watchlist");
            Ok(Membership::Added)
        }
    }
}
