use axum::{extract::State, Extension};
use serde::Serialize;
use uuid::Uuid;

use crate::{
    middleware::AccessToken,
    routes::page::{respond, Page, PageResult},
    services::feedback::Feedback,
    session::UserSession,
    state::AppState,
};

#[derive(Debug, Serialize)]
pub struct SessionSummary {
    pub signed_in: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub watchlist_count: usize,
    pub history_count: usize,
}

impl SessionSummary {
    fn anonymous() -> Self {
        Self {
            signed_in: false,
            user_id: None,
            email: None,
            watchlist_count: 0,
            history_count: 0,
        }
    }

    async fn of(session: &UserSession) -> Self {
        Self {
            signed_in: true,
            user_id: Some(session.user_id()),
            email: session.user().email.clone(),
            watchlist_count: session.watchlist().read().await.len(),
            history_count: session.history().read().await.entries().len(),
        }
    }
}

/// Page load: resolves the token's session and loads the user's mirrors
pub async fn start(
    State(state): State<AppState>,
    token: Option<Extension<AccessToken>>,
) -> PageResult<SessionSummary> {
    let Some(Extension(token)) = token else {
        return Ok(Page::data(SessionSummary::anonymous()));
    };

    let started = state
        .sessions
        .start(token.as_str(), state.auth.as_ref(), state.store.as_ref())
        .await;

    let summary = match started {
        Ok(Some(session)) => Some(SessionSummary::of(&session).await),
        Ok(None) => Some(SessionSummary::anonymous()),
        Err(e) => {
            tracing::error!(error = %e, "Session check failed");
            return respond(Err(e), Feedback::new());
        }
    };

    Ok(Page::new(summary, Feedback::new()))
}

#[derive(Debug, Serialize)]
pub struct SessionEnded {
    pub ended: bool,
}

/// Page teardown
pub async fn end(
    State(state): State<AppState>,
    token: Option<Extension<AccessToken>>,
) -> Page<SessionEnded> {
    let ended = match token {
        Some(Extension(token)) => state.sessions.end(token.as_str()).await,
        None => false,
    };
    Page::data(SessionEnded { ended })
}
