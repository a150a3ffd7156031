use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

use super::{ContentId, ContentItem, ContentKind};

/// Playback record for one user and one catalog item
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HistoryEntry {
    pub user_id: Uuid,
    pub content_id: ContentId,
    pub content_kind: ContentKind,
    pub title: String,
    pub poster_url: String,
    /// Percentage watched, 0..=100
    pub progress_percent: u8,
    pub watched_minutes: u32,
    pub watched_at: DateTime<Utc>,
    pub completed: bool,
}

impl HistoryEntry {
    /// Fresh entry for a playback start
    pub fn started(user_id: Uuid, item: &ContentItem) -> Self {
        Self {
            user_id,
            content_id: item.id,
            content_kind: item.kind,
            title: item.title.clone(),
            poster_url: item.image_url.clone(),
            progress_percent: 0,
            watched_minutes: 0,
            watched_at: Utc::now(),
            completed: false,
        }
    }

    pub fn apply(&mut self, patch: &ProgressPatch) {
        self.progress_percent = patch.progress_percent;
        if let Some(minutes) = patch.watched_minutes {
            self.watched_minutes = minutes;
        }
        if let Some(completed) = patch.completed {
            self.completed = completed;
        }
        self.watched_at = patch.watched_at;
    }
}

/// Partial update applied to an existing history row
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressPatch {
    pub progress_percent: u8,
    pub watched_minutes: Option<u32>,
    pub completed: Option<bool>,
    pub watched_at: DateTime<Utc>,
}

impl ProgressPatch {
    pub fn progress(progress_percent: u8, watched_minutes: u32) -> Self {
        Self {
            progress_percent,
            watched_minutes: Some(watched_minutes),
            completed: None,
            watched_at: Utc::now(),
        }
    }

    pub fn completed() -> Self {
        Self {
            progress_percent: 100,
            watched_minutes: None,
            completed: Some(true),
            watched_at: Utc::now(),
        }
    }
}

/// Session-local copy of the user's history, most recent first
#[derive(Debug, Clone, Default)]
pub struct HistoryMirror {
    entries: Vec<HistoryEntry>,
}

impl HistoryMirror {
    /// Builds a mirror from store rows, restoring most-recent-first order
    pub fn new(mut entries: Vec<HistoryEntry>) -> Self {
        entries.sort_by(|a, b| b.watched_at.cmp(&a.watched_at));
        let mut seen = HashSet::new();
        entries.retain(|e| seen.insert(e.content_id));
        Self { entries }
    }

    /// Replaces any entry for the same content and puts the new one first
    pub fn record(&mut self, entry: HistoryEntry) {
        self.entries.retain(|e| e.content_id != entry.content_id);
        self.entries.insert(0, entry);
    }

    /// Applies a confirmed patch; returns false when no entry is held
    pub fn apply(&mut self, content_id: ContentId, patch: &ProgressPatch) -> bool {
        let Some(position) = self.entries.iter().position(|e| e.content_id == content_id) else {
            return false;
        };
        let mut entry = self.entries.remove(position);
        entry.apply(patch);
        self.entries.insert(0, entry);
        true
    }

    pub fn get(&self, content_id: ContentId) -> Option<&HistoryEntry> {
        self.entries.iter().find(|e| e.content_id == content_id)
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
