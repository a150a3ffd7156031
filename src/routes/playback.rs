use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::{
    models::ContentId,
    routes::page::{respond, CurrentSession, PageResult},
    services::{feedback::Feedback, history::ProgressOutcome, views::PlayerView},
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct ProgressReport {
    current_seconds: f64,
    duration_seconds: f64,
}

#[derive(Debug, Serialize)]
pub struct Completion {
    pub recorded: bool,
}

/// Play from the beginning
pub async fn start(
    State(state): State<AppState>,
    session: CurrentSession,
    Path(id): Path<ContentId>,
) -> PageResult<PlayerView> {
    let mut feedback = Feedback::new();
    let result = state
        .interactions
        .play(session.as_deref(), id, &mut feedback)
        .await;
    respond(result, feedback)
}

/// Play from the recorded progress
pub async fn resume(
    State(state): State<AppState>,
    session: CurrentSession,
    Path(id): Path<ContentId>,
) -> PageResult<PlayerView> {
    let mut feedback = Feedback::new();
    let result = state
        .interactions
        .continue_watching(session.as_deref(), id, &mut feedback)
        .await;
    respond(result, feedback)
}

/// Player time update
pub async fn progress(
    State(state): State<AppState>,
    session: CurrentSession,
    Path(id): Path<ContentId>,
    Json(report): Json<ProgressReport>,
) -> PageResult<ProgressOutcome> {
    let result = state
        .interactions
        .report_progress(
            session.as_deref(),
            id,
            report.current_seconds,
            report.duration_seconds,
        )
        .await
        .map(Some);
    respond(result, Feedback::new())
}

/// Player reached the end
pub async fn complete(
    State(state): State<AppState>,
    session: CurrentSession,
    Path(id): Path<ContentId>,
) -> PageResult<Completion> {
    let mut feedback = Feedback::new();
    let result = state
        .interactions
        .complete(session.as_deref(), id, &mut feedback)
        .await
        .map(|recorded| Some(Completion { recorded }));
    respond(result, feedback)
}
