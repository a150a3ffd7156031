use axum::{
    http::StatusCode,
    middleware,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    middleware::{make_span_with_request_id, request_context_middleware},
    state::AppState,
};

pub mod catalog;
pub mod page;
pub mod playback;
pub mod profile;
pub mod session;
pub mod watchlist;

/// Creates the application router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", api_routes())
        .layer(
            ServiceBuilder::new()
                .layer(middleware::from_fn(request_context_middleware))
                .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

/// API routes under /api/v1
fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/session", post(session::start).delete(session::end))
        .route("/nav", get(catalog::nav))
        .route("/home", get(catalog::home))
        .route("/catalog", get(catalog::browse))
        .route("/catalog/search", get(catalog::search))
        .route("/catalog/filter", get(catalog::filter))
        .route("/content/:id", get(catalog::detail))
        .route("/watchlist", get(watchlist::list))
        .route("/watchlist/toggle", post(watchlist::toggle))
        .route("/playback/:id/start", post(playback::start))
        .route("/playback/:id/continue", post(playback::resume))
        .route("/playback/:id/progress", post(playback::progress))
        .route("/playback/:id/complete", post(playback::complete))
        .route("/profile", get(profile::show))
}

/// Health check endpoint
async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}
