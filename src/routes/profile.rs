use axum::extract::State;

use crate::{
    routes::page::{CurrentSession, Page},
    services::{feedback::Feedback, views::ProfileView},
    state::AppState,
};

/// Profile view; creates a minimal profile row on first visit
pub async fn show(State(state): State<AppState>, session: CurrentSession) -> Page<ProfileView> {
    let mut feedback = Feedback::new();
    let view = state
        .interactions
        .profile(session.as_deref(), &mut feedback)
        .await;
    Page::new(view, feedback)
}
