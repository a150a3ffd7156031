use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};

use crate::error::AppError;

/// Identifier of a catalog item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentId(pub i64);

impl Display for ContentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Kind of playable content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Movie,
    Series,
    Documentary,
}

impl ContentKind {
    /// Storage representation, also used in query strings
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentKind::Movie => "movie",
            ContentKind::Series => "series",
            ContentKind::Documentary => "documentary",
        }
    }

    /// Upper-case label shown on cards
    pub fn badge(&self) -> &'static str {
        match self {
            ContentKind::Movie => "MOVIE",
            ContentKind::Series => "SERIES",
            ContentKind::Documentary => "DOCUMENTARY",
        }
    }

    /// Poster used when a stored entry carries no image
    pub fn default_poster(&self) -> &'static str {
        match self {
            ContentKind::Movie => {
                "https://images.unsplash.com/photo-1489599162946-648913ad7e84?w=500&h=750&fit=crop"
            }
            ContentKind::Series => {
                "https://images.unsplash.com/photo-1598300042247-d088f8ab3a91?w=500&h=750&fit=crop"
            }
            ContentKind::Documentary => {
                "https://images.unsplash.com/photo-1544551763-46a013bb70d5?w=500&h=750&fit=crop"
            }
        }
    }
}

impl Display for ContentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "movie" => Ok(ContentKind::Movie),
            "series" => Ok(ContentKind::Series),
            "documentary" => Ok(ContentKind::Documentary),
            other => Err(AppError::InvalidInput(format!(
                "Unknown content kind: {}",
                other
            ))),
        }
    }
}

/// A playable catalog item
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ContentItem {
    pub id: ContentId,
    pub title: String,
    pub description: String,
    pub image_url: String,
    pub video_url: String,
    pub kind: ContentKind,
    pub genre: String,
    pub year: i32,
    pub rating: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seasons: Option<u32>,
}

impl ContentItem {
    /// Case-insensitive substring match over title, description and genre
    pub fn matches_term(&self, term: &str) -> bool {
        let needle = term.to_lowercase();
        self.title.to_lowercase().contains(&needle)
            || self.description.to_lowercase().contains(&needle)
            || self.genre.to_lowercase().contains(&needle)
    }

    pub fn genre_contains(&self, genre: &str) -> bool {
        self.genre.to_lowercase().contains(&genre.to_lowercase())
    }
}
