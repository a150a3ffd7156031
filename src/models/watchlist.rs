use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{ContentId, ContentItem, ContentKind};

/// A saved-for-later reference to a catalog item
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WatchlistEntry {
    pub user_id: Uuid,
    pub content_id: ContentId,
    pub content_kind: ContentKind,
    pub title: String,
    pub poster_url: String,
    pub added_at: DateTime<Utc>,
}

/// What a toggle needs to know about the item being toggled
#[derive(Debug, Clone, PartialEq)]
pub struct WatchlistToggle {
    pub content_id: ContentId,
    pub kind: ContentKind,
    pub title: String,
    pub poster_url: String,
}

impl From<&ContentItem> for WatchlistToggle {
    fn from(item: &ContentItem) -> Self {
        Self {
            content_id: item.id,
            kind: item.kind,
            title: item.title.clone(),
            poster_url: item.image_url.clone(),
        }
    }
}

impl WatchlistToggle {
    pub fn into_entry(self, user_id: Uuid) -> WatchlistEntry {
        WatchlistEntry {
            user_id,
            content_id: self.content_id,
            content_kind: self.kind,
            title: self.title,
            poster_url: self.poster_url,
            added_at: Utc::now(),
        }
    }
}

/// Counts shown in the my-list header
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub struct WatchlistStats {
    pub total: usize,
    pub movies: usize,
    pub series: usize,
    pub documentaries: usize,
}

/// Session-local copy of the user's watchlist rows
///
/// Writes are idempotent so two overlapping toggles cannot leave a duplicate
/// or drop an entry the store confirmed.
#[derive(Debug, Clone, Default)]
pub struct WatchlistMirror {
    entries: Vec<WatchlistEntry>,
}

impl WatchlistMirror {
    pub fn new(entries: Vec<WatchlistEntry>) -> Self {
        let mut mirror = Self::default();
        for entry in entries {
            mirror.insert(entry);
        }
        mirror
    }

    pub fn contains(&self, content_id: ContentId) -> bool {
        self.entries.iter().any(|e| e.content_id == content_id)
    }

    /// Appends an entry unless one with the same content id is already held
    pub fn insert(&mut self, entry: WatchlistEntry) -> bool {
        if self.contains(entry.content_id) {
            return false;
        }
        self.entries.push(entry);
        true
    }

    pub fn remove(&mut self, content_id: ContentId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.content_id != content_id);
        before != self.entries.len()
    }

    pub fn entries(&self) -> &[WatchlistEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn of_kind(&self, kind: Option<ContentKind>) -> Vec<&WatchlistEntry> {
        self.entries
            .iter()
            .filter(|e| kind.map_or(true, |k| e.content_kind == k))
            .collect()
    }

    pub fn stats(&self) -> WatchlistStats {
        let count = |kind| self.entries.iter().filter(|e| e.content_kind == kind).count();
        WatchlistStats {
            total: self.entries.len(),
            movies: count(ContentKind::Movie),
            series: count(ContentKind::Series),
            documentaries: count(ContentKind::Documentary),
        }
    }
}
