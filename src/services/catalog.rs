use serde::Serialize;
use tokio::sync::RwLock;

use crate::{
    models::{ContentId, ContentItem, ContentKind},
    services::images::ImageSource,
};

const VIDEO_BASE: &str = "https://commondatastorage.googleapis.com/gtv-videos-bucket/sample";

fn poster(photo: &str) -> String {
    format!(
        "https://images.unsplash.com/{}?w=500&h=750&fit=crop",
        photo
    )
}

fn video(file: &str) -> String {
    format!("{}/{}", VIDEO_BASE, file)
}

#[allow(clippy::too_many_arguments)]
fn item(
    id: i64,
    title: &str,
    description: &str,
    image_url: String,
    video_file: &str,
    kind: ContentKind,
    genre: &str,
    rating: f32,
    seasons: Option<u32>,
) -> ContentItem {
    ContentItem {
        id: ContentId(id),
        title: title.to_string(),
        description: description.to_string(),
        image_url,
        video_url: video(video_file),
        kind,
        genre: genre.to_string(),
        year: 2024,
        rating,
        seasons,
    }
}

/// The fixed demo catalog shipped with the page
pub fn demo_catalog() -> Vec<ContentItem> {
    use ContentKind::*;

    vec![
        item(1, "Extreme Action", "A film packed with adrenaline and spectacular stunt sequences.",
            poster("photo-1489599162946-648913ad7e84"), "BigBuckBunny.mp4", Movie, "Action", 4.5, None),
        item(2, "Family Drama", "A moving story about family ties and forgiveness.",
            poster("photo-1518929458119-e5bf444c30f4"), "ElephantsDream.mp4", Movie, "Drama", 4.2, None),
        item(3, "Future Sci-Fi", "A futuristic vision of humanity and technology.",
            poster("photo-1518709268805-4e9042af2176"), "ForBiggerBlazes.mp4", Movie, "Sci-Fi", 4.7, None),
        item(4, "Romantic Comedy", "A funny love story with unforgettable moments.",
            poster("photo-1485846234645-a62644f84728"), "ForBiggerEscapes.mp4", Movie, "Romance", 4.0, None),
        item(5, "The Digital Crown", "A series exploring power in the digital age.",
            poster("photo-1598300042247-d088f8ab3a91"), "ForBiggerFun.mp4", Series, "Drama", 4.6, Some(3)),
        item(6, "Urban Mysteries", "Unsolved cases in the big cities.",
            poster("photo-1505820013142-f86a3439c5b2"), "ForBiggerJoyrides.mp4", Series, "Mystery", 4.3, Some(2)),
        item(7, "Deep Oceans", "Exploring the ocean depths and their secrets.",
            poster("photo-1544551763-46a013bb70d5"), "SubaruOutbackOnStreetAndDirt.mp4", Documentary, "Nature", 4.8, None),
        item(8, "Lost Civilizations", "Ancient cultures and their unsolved mysteries.",
            poster("photo-1539650116574-75c0c6d73f6e"), "TearsOfSteel.mp4", Documentary, "History", 4.5, None),
    ]
}

/// Movies appended by the post-initialization expansion step, given their posters
fn expansion_items(posters: &[String]) -> Vec<ContentItem> {
    let poster_at = |i: usize| {
        posters
            .get(i)
            .cloned()
            .unwrap_or_else(|| ContentKind::Movie.default_poster().to_string())
    };

    vec![
        item(9, "City Adventure", "A thrilling urban adventure full of surprises.",
            poster_at(0), "VolkswagenGTIReview.mp4", ContentKind::Movie, "Adventure", 4.3, None),
        item(10, "Night Mystery", "A psychological thriller that will keep you awake.",
            poster_at(1), "WeAreGoingOnBullrun.mp4", ContentKind::Movie, "Thriller", 4.6, None),
    ]
}

/// Number of posters the expansion step asks the image source for
pub const EXPANSION_POSTER_COUNT: usize = 4;

/// Filter values accepted by the per-kind grids
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogFilter {
    pub kind: Option<ContentKind>,
    pub genre: Option<String>,
    pub year: Option<i32>,
}

/// Read-only in-memory content catalog
#[derive(Debug, Clone, Serialize)]
pub struct Catalog {
    items: Vec<ContentItem>,
    revision: u32,
    expanded: bool,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::demo()
    }
}

impl Catalog {
    pub fn new(items: Vec<ContentItem>) -> Self {
        Self {
            items,
            revision: 0,
            expanded: false,
        }
    }

    pub fn demo() -> Self {
        Self::new(demo_catalog())
    }

    /// Increases whenever the set of items changes
    pub fn revision(&self) -> u32 {
        self.revision
    }

    pub fn is_expanded(&self) -> bool {
        self.expanded
    }

    pub fn get(&self, id: ContentId) -> Option<&ContentItem> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn of_kind(&self, kind: Option<ContentKind>) -> Vec<&ContentItem> {
        self.items
            .iter()
            .filter(|item| kind.map_or(true, |k| item.kind == k))
            .collect()
    }

    /// Case-insensitive search over title, description and genre.
    /// A blank term returns every item of the requested kind.
    pub fn search(&self, term: &str, kind: Option<ContentKind>) -> Vec<&ContentItem> {
        let term = term.trim();
        self.of_kind(kind)
            .into_iter()
            .filter(|item| term.is_empty() || item.matches_term(term))
            .collect()
    }

    pub fn filter(&self, filter: &CatalogFilter) -> Vec<&ContentItem> {
        self.of_kind(filter.kind)
            .into_iter()
            .filter(|item| {
                filter
                    .genre
                    .as_deref()
                    .filter(|g| !g.trim().is_empty())
                    .map_or(true, |g| item.genre_contains(g.trim()))
            })
            .filter(|item| filter.year.map_or(true, |y| item.year == y))
            .collect()
    }

    /// Movies and series whose genre is action or adventure
    pub fn action_and_adventure(&self) -> Vec<&ContentItem> {
        self.items
            .iter()
            .filter(|item| item.kind != ContentKind::Documentary)
            .filter(|item| item.genre_contains("action") || item.genre_contains("adventure"))
            .collect()
    }

    /// Featured item for the home hero: the first movie
    pub fn hero(&self) -> Option<&ContentItem> {
        self.items.iter().find(|item| item.kind == ContentKind::Movie)
    }

    /// Appends the expansion movies once. Returns the number of items added.
    pub fn expand(&mut self, posters: &[String]) -> usize {
        if self.expanded {
            return 0;
        }
        self.expanded = true;

        let mut added = 0;
        for item in expansion_items(posters) {
            if self.get(item.id).is_none() {
                self.items.push(item);
                added += 1;
            }
        }
        if added > 0 {
            self.revision += 1;
        }
        added
    }
}

/// Post-init expansion step, run before the listener accepts requests.
///
/// Posters come from the image source; when it fails the expansion still
/// happens with the per-kind default posters.
pub async fn expand_catalog(catalog: &RwLock<Catalog>, images: &dyn ImageSource) -> usize {
    if catalog.read().await.is_expanded() {
        return 0;
    }

    let posters = match images.poster_urls(EXPANSION_POSTER_COUNT).await {
        Ok(posters) => posters,
        Err(e) => {
            tracing::warn!(source = images.name(), error = %e, "Poster lookup failed; using defaults");
            Vec::new()
        }
    };

    let added = catalog.write().await.expand(&posters);
    tracing::info!(source = images.name(), added, "Catalog expanded");
    added
}
