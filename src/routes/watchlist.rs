use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;

use crate::{
    models::{ContentId, ContentKind},
    routes::page::{respond, CurrentSession, Page, PageResult},
    services::{
        feedback::Feedback,
        views::{WatchlistControl, WatchlistView},
    },
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    kind: Option<ContentKind>,
}

#[derive(Debug, Deserialize)]
pub struct ToggleRequest {
    content_id: ContentId,
}

/// My list, optionally narrowed to one kind
pub async fn list(
    State(state): State<AppState>,
    session: CurrentSession,
    Query(params): Query<ListQuery>,
) -> Page<WatchlistView> {
    let mut feedback = Feedback::new();
    let view = state
        .interactions
        .my_list(session.as_deref(), params.kind, &mut feedback)
        .await;
    Page::new(view, feedback)
}

pub async fn toggle(
    State(state): State<AppState>,
    session: CurrentSession,
    Json(request): Json<ToggleRequest>,
) -> PageResult<WatchlistControl> {
    let mut feedback = Feedback::new();
    let result = state
        .interactions
        .toggle_watchlist(session.as_deref(), request.content_id, &mut feedback)
        .await;
    respond(result, feedback)
}
