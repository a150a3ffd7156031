//! Named entry points the page shell calls: content display, list
//! toggling, playback and filtering. Each composes the session gate, the
//! catalog and the managers, and reports side effects through [`Feedback`].

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::{
    db::DataStore,
    error::{AppError, AppResult},
    models::{ContentId, ContentItem, ContentKind, WatchlistMirror, WatchlistToggle},
    services::{
        catalog::{Catalog, CatalogFilter},
        feedback::{AuthViews, Feedback},
        history::{HistoryTracker, ProgressOutcome},
        profile,
        session_gate::{GatedAction, SessionGate},
        views::{self, DetailView, GridView, HomeView, NavBar, PlayerView, ProfileView},
        views::{Section, WatchlistControl, WatchlistView, CONTINUE_WATCHING_LIMIT},
        watchlist::WatchlistManager,
    },
    session::UserSession,
};

async fn with_watchlist<R>(
    session: Option<&UserSession>,
    render: impl FnOnce(&WatchlistMirror) -> R,
) -> R {
    match session {
        Some(session) => render(&*session.watchlist().read().await),
        None => render(&WatchlistMirror::default()),
    }
}

#[derive(Clone)]
pub struct Interactions {
    store: Arc<dyn DataStore>,
    catalog: Arc<RwLock<Catalog>>,
    gate: SessionGate,
    watchlist: WatchlistManager,
    history: HistoryTracker,
}

impl Interactions {
    pub fn new(
        store: Arc<dyn DataStore>,
        catalog: Arc<RwLock<Catalog>>,
        views: Arc<dyn AuthViews>,
    ) -> Self {
        Self {
            watchlist: WatchlistManager::new(store.clone()),
            history: HistoryTracker::new(store.clone()),
            gate: SessionGate::new(views),
            store,
            catalog,
        }
    }

    pub fn gate(&self) -> &SessionGate {
        &self.gate
    }

    /// Catalog item by id; a miss is reported to the user
    async fn lookup(&self, id: ContentId, feedback: &mut Feedback) -> AppResult<ContentItem> {
        match self.catalog.read().await.get(id) {
            Some(item) => Ok(item.clone()),
            None => {
                tracing::warn!(content_id = %id, "Requested content is not in the catalog");
                feedback.error("Content not available");
                Err(AppError::NotFound(format!("Content {} not found", id)))
            }
        }
    }

    pub fn nav(&self, signed_in: bool) -> NavBar {
        views::nav_bar(signed_in, self.gate.views())
    }

    pub async fn home(&self, session: Option<&UserSession>) -> HomeView {
        let catalog = self.catalog.read().await;

        let continue_watching = match session {
            Some(session) => {
                let history = session.history().read().await;
                (!history.is_empty()).then(|| {
                    history
                        .entries()
                        .iter()
                        .take(CONTINUE_WATCHING_LIMIT)
                        .map(views::history_card)
                        .collect()
                })
            }
            None => None,
        };

        let sections = with_watchlist(session, |watchlist| {
            vec![
                Section {
                    id: "featured-movies",
                    title: "Featured movies",
                    cards: views::content_cards(catalog.of_kind(Some(ContentKind::Movie)), watchlist),
                },
                Section {
                    id: "popular-series",
                    title: "Popular series",
                    cards: views::content_cards(catalog.of_kind(Some(ContentKind::Series)), watchlist),
                },
                Section {
                    id: "documentaries",
                    title: "Documentaries",
                    cards: views::content_cards(
                        catalog.of_kind(Some(ContentKind::Documentary)),
                        watchlist,
                    ),
                },
                Section {
                    id: "action-adventure",
                    title: "Action & adventure",
                    cards: views::content_cards(catalog.action_and_adventure(), watchlist),
                },
            ]
        })
        .await;

        HomeView {
            hero: catalog.hero().map(views::hero),
            continue_watching,
            sections,
            catalog_revision: catalog.revision(),
        }
    }

    pub async fn browse(&self, session: Option<&UserSession>, kind: Option<ContentKind>) -> GridView {
        self.search(session, "", kind).await
    }

    pub async fn search(
        &self,
        session: Option<&UserSession>,
        term: &str,
        kind: Option<ContentKind>,
    ) -> GridView {
        let catalog = self.catalog.read().await;
        let cards = with_watchlist(session, |watchlist| {
            views::content_cards(catalog.search(term, kind), watchlist)
        })
        .await;

        GridView {
            kind,
            cards,
            catalog_revision: catalog.revision(),
        }
    }

    pub async fn filter(&self, session: Option<&UserSession>, filter: &CatalogFilter) -> GridView {
        let catalog = self.catalog.read().await;
        let cards = with_watchlist(session, |watchlist| {
            views::content_cards(catalog.filter(filter), watchlist)
        })
        .await;

        GridView {
            kind: filter.kind,
            cards,
            catalog_revision: catalog.revision(),
        }
    }

    /// Detail view; available without a session, with a login prompt
    pub async fn show_detail(
        &self,
        session: Option<&UserSession>,
        id: ContentId,
        feedback: &mut Feedback,
    ) -> AppResult<DetailView> {
        let item = self.lookup(id, feedback).await?;

        Ok(match session {
            Some(session) => {
                let watchlist = session.watchlist().read().await;
                views::detail_view(&item, Some(&watchlist), self.gate.views())
            }
            None => views::detail_view(&item, None, self.gate.views()),
        })
    }

    /// Toggles watchlist membership. `Ok(None)` means the gate blocked it.
    pub async fn toggle_watchlist(
        &self,
        session: Option<&UserSession>,
        id: ContentId,
        feedback: &mut Feedback,
    ) -> AppResult<Option<WatchlistControl>> {
        let Some(session) = self.gate.authorize(session, GatedAction::AddToList, feedback) else {
            return Ok(None);
        };
        let item = self.lookup(id, feedback).await?;

        let membership = self
            .watchlist
            .toggle(session, WatchlistToggle::from(&item), feedback)
            .await?;

        Ok(Some(WatchlistControl::new(membership.in_watchlist())))
    }

    pub async fn my_list(
        &self,
        session: Option<&UserSession>,
        filter: Option<ContentKind>,
        feedback: &mut Feedback,
    ) -> Option<WatchlistView> {
        let session = self.gate.authorize(session, GatedAction::MyList, feedback)?;
        let watchlist = session.watchlist().read().await;
        Some(views::watchlist_view(&watchlist, filter))
    }

    async fn start_playback(
        &self,
        session: &UserSession,
        item: &ContentItem,
        resume_from_percent: u8,
        feedback: &mut Feedback,
    ) -> PlayerView {
        // History is best-effort; playback starts either way
        self.history.record_view(session, item).await;
        feedback.success("Enjoy your content!");
        views::player_view(item, resume_from_percent)
    }

    /// Starts playback from the beginning. `Ok(None)` means the gate blocked it.
    pub async fn play(
        &self,
        session: Option<&UserSession>,
        id: ContentId,
        feedback: &mut Feedback,
    ) -> AppResult<Option<PlayerView>> {
        let Some(session) = self.gate.authorize(session, GatedAction::Play, feedback) else {
            return Ok(None);
        };
        let item = self.lookup(id, feedback).await?;

        Ok(Some(self.start_playback(session, &item, 0, feedback).await))
    }

    /// Resumes playback where the history left off
    pub async fn continue_watching(
        &self,
        session: Option<&UserSession>,
        id: ContentId,
        feedback: &mut Feedback,
    ) -> AppResult<Option<PlayerView>> {
        let Some(session) = self.gate.authorize(session, GatedAction::Continue, feedback) else {
            return Ok(None);
        };
        let item = self.lookup(id, feedback).await?;

        let resume_from = session
            .history()
            .read()
            .await
            .get(id)
            .map(|entry| entry.progress_percent);

        let player = self
            .start_playback(session, &item, resume_from.unwrap_or(0), feedback)
            .await;
        if let Some(percent) = resume_from {
            feedback.info(format!("Resuming from {}%", percent));
        }

        Ok(Some(player))
    }

    /// Playback tick from the player. Not gated with a redirect: without a
    /// session nothing is computed or written.
    pub async fn report_progress(
        &self,
        session: Option<&UserSession>,
        id: ContentId,
        current_seconds: f64,
        duration_seconds: f64,
    ) -> AppResult<ProgressOutcome> {
        let Some(session) = session else {
            return Ok(ProgressOutcome::Ignored);
        };
        let item = self.lookup(id, &mut Feedback::new()).await?;

        Ok(self
            .history
            .update_progress(session, &item, current_seconds, duration_seconds)
            .await)
    }

    /// Playback finished. Without a session this is a no-op.
    pub async fn complete(
        &self,
        session: Option<&UserSession>,
        id: ContentId,
        feedback: &mut Feedback,
    ) -> AppResult<bool> {
        let Some(session) = session else {
            return Ok(false);
        };
        let item = self.lookup(id, feedback).await?;

        Ok(self.history.mark_completed(session, &item, feedback).await)
    }

    /// Profile view, shown only once the profile row is known to exist
    pub async fn profile(
        &self,
        session: Option<&UserSession>,
        feedback: &mut Feedback,
    ) -> Option<ProfileView> {
        let session = self.gate.authorize(session, GatedAction::Profile, feedback)?;
        let profile = profile::session_profile(self.store.as_ref(), session, feedback).await?;

        Some(ProfileView {
            profile,
            edit: self.gate.views().profile(),
        })
    }
}
