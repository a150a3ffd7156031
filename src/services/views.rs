//! Render trees for the page shell
//!
//! Every function here is pure: (catalog state, mirrors) in, serializable
//! view structs out. The page shell turns them into markup.

use serde::Serialize;

use crate::{
    models::{
        ContentId, ContentItem, ContentKind, HistoryEntry, UserProfile, WatchlistEntry,
        WatchlistMirror, WatchlistStats,
    },
    services::feedback::{AuthView, AuthViews},
};

/// Number of history cards shown in the continue-watching row
pub const CONTINUE_WATCHING_LIMIT: usize = 10;

/// Toggle control on a card
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct WatchlistControl {
    pub in_watchlist: bool,
    pub label: &'static str,
}

impl WatchlistControl {
    pub fn new(in_watchlist: bool) -> Self {
        Self {
            in_watchlist,
            label: if in_watchlist { "In My List" } else { "Add to My List" },
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ContentCard {
    pub id: ContentId,
    pub title: String,
    pub poster_url: String,
    pub kind: ContentKind,
    pub badge: &'static str,
    pub rating: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seasons_label: Option<String>,
    pub watchlist: WatchlistControl,
    pub detail_href: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct HistoryCard {
    pub content_id: ContentId,
    pub title: String,
    pub poster_url: String,
    pub badge: &'static str,
    pub progress_percent: u8,
    pub completed: bool,
}

/// Card for a saved watchlist entry; its control always removes
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SavedCard {
    pub content_id: ContentId,
    pub title: String,
    pub poster_url: String,
    pub badge: &'static str,
    pub detail_href: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Section {
    pub id: &'static str,
    pub title: &'static str,
    pub cards: Vec<ContentCard>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Hero {
    pub content_id: ContentId,
    pub title: String,
    pub description: String,
    pub backdrop_url: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct HomeView {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hero: Option<Hero>,
    /// Omitted when there is no history
    #[serde(skip_serializing_if = "Option::is_none")]
    pub continue_watching: Option<Vec<HistoryCard>>,
    pub sections: Vec<Section>,
    pub catalog_revision: u32,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct GridView {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<ContentKind>,
    pub cards: Vec<ContentCard>,
    pub catalog_revision: u32,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct LoginPrompt {
    pub message: &'static str,
    pub login: AuthView,
    pub registration: AuthView,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DetailView {
    pub content: ContentItem,
    pub meta_line: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seasons_label: Option<String>,
    pub watchlist: WatchlistControl,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub login_prompt: Option<LoginPrompt>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PlayerView {
    pub content_id: ContentId,
    pub title: String,
    pub description: String,
    pub video_url: String,
    pub poster_url: String,
    pub resume_from_percent: u8,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct WatchlistView {
    pub stats: WatchlistStats,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<ContentKind>,
    pub cards: Vec<SavedCard>,
    pub empty_message: Option<&'static str>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ProfileView {
    pub profile: UserProfile,
    pub edit: AuthView,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct NavItem {
    pub label: &'static str,
    pub href: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct NavBar {
    pub items: Vec<NavItem>,
    pub signed_in: bool,
}

fn seasons_label(item: &ContentItem) -> Option<String> {
    item.seasons.map(|n| match n {
        1 => "1 season".to_string(),
        n => format!("{} seasons", n),
    })
}

fn detail_href(id: ContentId) -> String {
    format!("/content/{}", id)
}

fn poster_or_default(poster_url: &str, kind: ContentKind) -> String {
    if poster_url.is_empty() {
        kind.default_poster().to_string()
    } else {
        poster_url.to_string()
    }
}

pub fn content_card(item: &ContentItem, watchlist: &WatchlistMirror) -> ContentCard {
    ContentCard {
        id: item.id,
        title: item.title.clone(),
        poster_url: item.image_url.clone(),
        kind: item.kind,
        badge: item.kind.badge(),
        rating: item.rating,
        seasons_label: seasons_label(item),
        watchlist: WatchlistControl::new(watchlist.contains(item.id)),
        detail_href: detail_href(item.id),
    }
}

pub fn content_cards<'a>(
    items: impl IntoIterator<Item = &'a ContentItem>,
    watchlist: &WatchlistMirror,
) -> Vec<ContentCard> {
    items
        .into_iter()
        .map(|item| content_card(item, watchlist))
        .collect()
}

pub fn history_card(entry: &HistoryEntry) -> HistoryCard {
    HistoryCard {
        content_id: entry.content_id,
        title: entry.title.clone(),
        poster_url: poster_or_default(&entry.poster_url, entry.content_kind),
        badge: entry.content_kind.badge(),
        progress_percent: entry.progress_percent,
        completed: entry.completed,
    }
}

pub fn saved_card(entry: &WatchlistEntry) -> SavedCard {
    SavedCard {
        content_id: entry.content_id,
        title: entry.title.clone(),
        poster_url: poster_or_default(&entry.poster_url, entry.content_kind),
        badge: entry.content_kind.badge(),
        detail_href: detail_href(entry.content_id),
    }
}

pub fn hero(item: &ContentItem) -> Hero {
    Hero {
        content_id: item.id,
        title: item.title.clone(),
        description: item.description.clone(),
        backdrop_url: item.image_url.clone(),
    }
}

pub fn detail_view(
    item: &ContentItem,
    watchlist: Option<&WatchlistMirror>,
    views: &dyn AuthViews,
) -> DetailView {
    let login_prompt = match watchlist {
        Some(_) => None,
        None => Some(LoginPrompt {
            message: "Sign in to access every feature",
            login: views.login(),
            registration: views.registration(),
        }),
    };

    DetailView {
        content: item.clone(),
        meta_line: format!("{} • {} • ★ {}", item.year, item.genre, item.rating),
        seasons_label: seasons_label(item),
        watchlist: WatchlistControl::new(watchlist.is_some_and(|w| w.contains(item.id))),
        login_prompt,
    }
}

pub fn player_view(item: &ContentItem, resume_from_percent: u8) -> PlayerView {
    PlayerView {
        content_id: item.id,
        title: item.title.clone(),
        description: item.description.clone(),
        video_url: item.video_url.clone(),
        poster_url: item.image_url.clone(),
        resume_from_percent,
    }
}

pub fn watchlist_view(watchlist: &WatchlistMirror, filter: Option<ContentKind>) -> WatchlistView {
    let cards: Vec<SavedCard> = watchlist.of_kind(filter).into_iter().map(saved_card).collect();

    let empty_message = if watchlist.is_empty() {
        Some("Your list is empty. Add movies, series and documentaries to watch later.")
    } else if cards.is_empty() {
        Some("No content of this type")
    } else {
        None
    };

    WatchlistView {
        stats: watchlist.stats(),
        filter,
        cards,
        empty_message,
    }
}

pub fn nav_bar(signed_in: bool, views: &dyn AuthViews) -> NavBar {
    let mut items = vec![
        NavItem { label: "Home", href: "/".to_string() },
        NavItem { label: "Movies", href: "/catalog?kind=movie".to_string() },
        NavItem { label: "Series", href: "/catalog?kind=series".to_string() },
        NavItem { label: "Documentaries", href: "/catalog?kind=documentary".to_string() },
        NavItem { label: "My List", href: "/watchlist".to_string() },
    ];

    items.push(if signed_in {
        NavItem { label: "Profile", href: views.profile().path }
    } else {
        NavItem { label: "Register", href: views.registration().path }
    });

    NavBar { items, signed_in }
}
