use axum::extract::{Path, Query, State};
use serde::Deserialize;

use crate::{
    models::{ContentId, ContentKind},
    routes::page::{respond, CurrentSession, Page, PageResult},
    services::{
        catalog::CatalogFilter,
        feedback::Feedback,
        views::{DetailView, GridView, HomeView, NavBar},
    },
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct KindQuery {
    kind: Option<ContentKind>,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    q: String,
    kind: Option<ContentKind>,
}

#[derive(Debug, Deserialize)]
pub struct FilterQuery {
    kind: Option<ContentKind>,
    genre: Option<String>,
    year: Option<i32>,
}

impl From<FilterQuery> for CatalogFilter {
    fn from(query: FilterQuery) -> Self {
        CatalogFilter {
            kind: query.kind,
            genre: query.genre.filter(|g| !g.trim().is_empty()),
            year: query.year,
        }
    }
}

pub async fn nav(State(state): State<AppState>, session: CurrentSession) -> Page<NavBar> {
    Page::data(state.interactions.nav(session.0.is_some()))
}

pub async fn home(State(state): State<AppState>, session: CurrentSession) -> Page<HomeView> {
    Page::data(state.interactions.home(session.as_deref()).await)
}

/// Whole catalog, or the grid for one kind
pub async fn browse(
    State(state): State<AppState>,
    session: CurrentSession,
    Query(params): Query<KindQuery>,
) -> Page<GridView> {
    Page::data(
        state
            .interactions
            .browse(session.as_deref(), params.kind)
            .await,
    )
}

pub async fn search(
    State(state): State<AppState>,
    session: CurrentSession,
    Query(params): Query<SearchQuery>,
) -> Page<GridView> {
    Page::data(
        state
            .interactions
            .search(session.as_deref(), &params.q, params.kind)
            .await,
    )
}

pub async fn filter(
    State(state): State<AppState>,
    session: CurrentSession,
    Query(params): Query<FilterQuery>,
) -> Page<GridView> {
    let filter = CatalogFilter::from(params);
    Page::data(state.interactions.filter(session.as_deref(), &filter).await)
}

pub async fn detail(
    State(state): State<AppState>,
    session: CurrentSession,
    Path(id): Path<ContentId>,
) -> PageResult<DetailView> {
    let mut feedback = Feedback::new();
    let result = state
        .interactions
        .show_detail(session.as_deref(), id, &mut feedback)
        .await
        .map(Some);
    respond(result, feedback)
}
