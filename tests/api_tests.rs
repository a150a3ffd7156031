use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::http::{header::AUTHORIZATION, HeaderValue, StatusCode};
use axum_test::TestServer;
use serde_json::{json, Value};
use uuid::Uuid;

use streamflix::{
    db::{DataStore, MemoryStore},
    error::{AppError, AppResult},
    models::{ContentId, HistoryEntry, ProgressPatch, Session, User, UserProfile, WatchlistEntry},
    routes::create_router,
    services::{auth::AuthService, catalog::Catalog, feedback::HostedAuthViews},
    state::AppState,
};

const TOKEN: &str = "token-1";

/// Accepts exactly one token
struct FixedAuth {
    user: User,
}

#[async_trait]
impl AuthService for FixedAuth {
    async fn current_session(&self, access_token: &str) -> AppResult<Option<Session>> {
        Ok((access_token == TOKEN).then(|| Session {
            access_token: access_token.to_string(),
            user: self.user.clone(),
        }))
    }

    fn name(&self) -> &'static str {
        "fixed"
    }
}

/// Memory store whose watchlist writes are rejected
#[derive(Default)]
struct RejectingWatchlistStore {
    inner: MemoryStore,
}

#[async_trait]
impl DataStore for RejectingWatchlistStore {
    async fn find_profile(&self, user_id: Uuid) -> AppResult<Option<UserProfile>> {
        self.inner.find_profile(user_id).await
    }

    async fn insert_profile(&self, profile: &UserProfile) -> AppResult<()> {
        self.inner.insert_profile(profile).await
    }

    async fn list_watchlist(&self, user_id: Uuid) -> AppResult<Vec<WatchlistEntry>> {
        self.inner.list_watchlist(user_id).await
    }

    async fn insert_watchlist_entry(&self, _entry: &WatchlistEntry) -> AppResult<()> {
        Err(AppError::Store("permission denied for table watchlist_entries".to_string()))
    }

    async fn delete_watchlist_entry(&self, _user_id: Uuid, _content_id: ContentId) -> AppResult<()> {
        Err(AppError::Store("permission denied for table watchlist_entries".to_string()))
    }

    async fn list_history(&self, user_id: Uuid) -> AppResult<Vec<HistoryEntry>> {
        self.inner.list_history(user_id).await
    }

    async fn upsert_history_entry(&self, entry: &HistoryEntry) -> AppResult<()> {
        self.inner.upsert_history_entry(entry).await
    }

    async fn update_history_progress(
        &self,
        user_id: Uuid,
        content_id: ContentId,
        patch: &ProgressPatch,
    ) -> AppResult<()> {
        self.inner
            .update_history_progress(user_id, content_id, patch)
            .await
    }

    fn name(&self) -> &'static str {
        "rejecting"
    }
}

fn create_app_state(store: Arc<dyn DataStore>) -> AppState {
    let auth = Arc::new(FixedAuth {
        user: User {
            id: Uuid::new_v4(),
            email: Some("viewer@example.com".to_string()),
        },
    });
    AppState::new(
        auth,
        store,
        Catalog::demo(),
        Arc::new(HostedAuthViews::default()),
    )
}

fn create_test_server() -> TestServer {
    let state = create_app_state(Arc::new(MemoryStore::new()));
    TestServer::new(create_router(state)).unwrap()
}

fn bearer(token: &str) -> HeaderValue {
    HeaderValue::from_str(&format!("Bearer {}", token)).unwrap()
}

async fn sign_in(server: &TestServer) {
    let response = server
        .post("/api/v1/session")
        .add_header(AUTHORIZATION, bearer(TOKEN))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["data"]["signed_in"], true);
}

fn card_ids(body: &Value) -> Vec<i64> {
    body["data"]["cards"]
        .as_array()
        .unwrap()
        .iter()
        .map(|card| card["id"].as_i64().unwrap())
        .collect()
}

#[tokio::test]
async fn test_health_check() {
    let server = create_test_server();
    let response = server.get("/health").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_search_drama() {
    let server = create_test_server();

    let response = server
        .get("/api/v1/catalog/search")
        .add_query_param("q", "drama")
        .await;
    response.assert_status_ok();
    assert_eq!(card_ids(&response.json()), vec![2, 5]);
}

#[tokio::test]
async fn test_filter_series_by_genre() {
    let server = create_test_server();

    let response = server
        .get("/api/v1/catalog/filter")
        .add_query_param("kind", "series")
        .add_query_param("genre", "myst")
        .await;
    response.assert_status_ok();
    assert_eq!(card_ids(&response.json()), vec![6]);
}

#[tokio::test]
async fn test_anonymous_toggle_redirects_to_login() {
    let server = create_test_server();

    let response = server
        .post("/api/v1/watchlist/toggle")
        .json(&json!({ "content_id": 3 }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert!(body["data"].is_null());
    assert_eq!(body["redirect"]["name"], "login");
    assert_eq!(body["redirect"]["path"], "/login");
    assert_eq!(body["notifications"][0]["message"], "Sign in to add to your list");
}

#[tokio::test]
async fn test_unstarted_token_is_anonymous() {
    let server = create_test_server();

    let response = server
        .post("/api/v1/playback/1/start")
        .add_header(AUTHORIZATION, bearer(TOKEN))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert!(body["data"].is_null());
    assert_eq!(body["notifications"][0]["message"], "Sign in to play content");
}

#[tokio::test]
async fn test_invalid_token_starts_no_session() {
    let server = create_test_server();

    let response = server
        .post("/api/v1/session")
        .add_header(AUTHORIZATION, bearer("expired"))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["data"]["signed_in"], false);
}

#[tokio::test]
async fn test_toggle_add_then_remove() {
    let server = create_test_server();
    sign_in(&server).await;

    let response = server
        .post("/api/v1/watchlist/toggle")
        .add_header(AUTHORIZATION, bearer(TOKEN))
        .json(&json!({ "content_id": 2 }))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["data"]["in_watchlist"], true);
    assert_eq!(body["data"]["label"], "In My List");
    assert_eq!(body["notifications"][0]["message"], "Added to My List!");

    let response = server
        .get("/api/v1/watchlist")
        .add_header(AUTHORIZATION, bearer(TOKEN))
        .await;
    let body: Value = response.json();
    assert_eq!(body["data"]["stats"]["total"], 1);
    assert_eq!(body["data"]["stats"]["movies"], 1);
    assert_eq!(body["data"]["cards"][0]["content_id"], 2);

    let response = server
        .post("/api/v1/watchlist/toggle")
        .add_header(AUTHORIZATION, bearer(TOKEN))
        .json(&json!({ "content_id": 2 }))
        .await;
    let body: Value = response.json();
    assert_eq!(body["data"]["in_watchlist"], false);
    assert_eq!(body["notifications"][0]["message"], "Removed from My List");

    let response = server
        .get("/api/v1/watchlist")
        .add_header(AUTHORIZATION, bearer(TOKEN))
        .await;
    let body: Value = response.json();
    assert_eq!(body["data"]["stats"]["total"], 0);
}

#[tokio::test]
async fn test_watchlist_survives_new_page_load() {
    let server = create_test_server();
    sign_in(&server).await;

    server
        .post("/api/v1/watchlist/toggle")
        .add_header(AUTHORIZATION, bearer(TOKEN))
        .json(&json!({ "content_id": 7 }))
        .await
        .assert_status_ok();

    // A second page load rebuilds the mirrors from the store
    sign_in(&server).await;

    let response = server
        .get("/api/v1/catalog")
        .add_header(AUTHORIZATION, bearer(TOKEN))
        .add_query_param("kind", "documentary")
        .await;
    let body: Value = response.json();
    assert_eq!(body["data"]["cards"][0]["id"], 7);
    assert_eq!(body["data"]["cards"][0]["watchlist"]["in_watchlist"], true);
    assert_eq!(body["data"]["cards"][1]["watchlist"]["in_watchlist"], false);
}

#[tokio::test]
async fn test_play_progress_complete_flow() {
    let server = create_test_server();
    sign_in(&server).await;

    let response = server
        .post("/api/v1/playback/3/start")
        .add_header(AUTHORIZATION, bearer(TOKEN))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["data"]["content_id"], 3);
    assert_eq!(body["data"]["resume_from_percent"], 0);

    let response = server
        .post("/api/v1/playback/3/progress")
        .add_header(AUTHORIZATION, bearer(TOKEN))
        .json(&json!({ "current_seconds": 15.0, "duration_seconds": 100.0 }))
        .await;
    let body: Value = response.json();
    assert_eq!(body["data"], json!({ "status": "throttled", "progress": 15 }));

    let response = server
        .post("/api/v1/playback/3/progress")
        .add_header(AUTHORIZATION, bearer(TOKEN))
        .json(&json!({ "current_seconds": 30.0, "duration_seconds": 100.0 }))
        .await;
    let body: Value = response.json();
    assert_eq!(body["data"], json!({ "status": "saved", "progress": 30 }));

    let response = server
        .post("/api/v1/playback/3/continue")
        .add_header(AUTHORIZATION, bearer(TOKEN))
        .await;
    let body: Value = response.json();
    assert_eq!(body["data"]["resume_from_percent"], 30);

    let response = server
        .post("/api/v1/playback/3/complete")
        .add_header(AUTHORIZATION, bearer(TOKEN))
        .await;
    let body: Value = response.json();
    assert_eq!(body["data"]["recorded"], true);
    assert_eq!(body["notifications"][0]["message"], "Content completed!");

    let response = server
        .get("/api/v1/home")
        .add_header(AUTHORIZATION, bearer(TOKEN))
        .await;
    let body: Value = response.json();
    let row = &body["data"]["continue_watching"];
    assert_eq!(row[0]["content_id"], 3);
    assert_eq!(row[0]["progress_percent"], 100);
    assert_eq!(row[0]["completed"], true);
}

#[tokio::test]
async fn test_unknown_content_is_not_found() {
    let server = create_test_server();
    sign_in(&server).await;

    let response = server
        .post("/api/v1/watchlist/toggle")
        .add_header(AUTHORIZATION, bearer(TOKEN))
        .json(&json!({ "content_id": 999 }))
        .await;
    response.assert_status(StatusCode::NOT_FOUND);
    let body: Value = response.json();
    assert_eq!(body["notifications"][0]["message"], "Content not available");

    server
        .get("/api/v1/content/999")
        .await
        .assert_status(StatusCode::NOT_FOUND);

    let response = server
        .get("/api/v1/watchlist")
        .add_header(AUTHORIZATION, bearer(TOKEN))
        .await;
    let body: Value = response.json();
    assert_eq!(body["data"]["stats"]["total"], 0);
}

#[tokio::test]
async fn test_detail_for_anonymous_visitor_has_login_prompt() {
    let server = create_test_server();

    let response = server.get("/api/v1/content/5").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["data"]["content"]["title"], "The Digital Crown");
    assert_eq!(body["data"]["seasons_label"], "3 seasons");
    assert_eq!(body["data"]["login_prompt"]["login"]["path"], "/login");
}

#[tokio::test]
async fn test_profile_created_on_first_visit() {
    let server = create_test_server();
    sign_in(&server).await;

    let response = server
        .get("/api/v1/profile")
        .add_header(AUTHORIZATION, bearer(TOKEN))
        .await;
    let body: Value = response.json();
    assert_eq!(body["data"]["profile"]["username"], "viewer");
    assert_eq!(
        body["notifications"][0]["message"],
        "Profile created. Please complete your information."
    );

    let response = server
        .get("/api/v1/profile")
        .add_header(AUTHORIZATION, bearer(TOKEN))
        .await;
    let body: Value = response.json();
    assert_eq!(body["notifications"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_nav_switches_register_for_profile() {
    let server = create_test_server();

    let response = server.get("/api/v1/nav").await;
    let body: Value = response.json();
    let labels: Vec<&str> = body["data"]["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["label"].as_str().unwrap())
        .collect();
    assert!(labels.contains(&"Register"));

    sign_in(&server).await;
    let response = server
        .get("/api/v1/nav")
        .add_header(AUTHORIZATION, bearer(TOKEN))
        .await;
    let body: Value = response.json();
    assert_eq!(body["data"]["signed_in"], true);
    assert_eq!(body["data"]["items"][5]["label"], "Profile");
}

#[tokio::test]
async fn test_ended_session_is_anonymous() {
    let server = create_test_server();
    sign_in(&server).await;

    let response = server
        .delete("/api/v1/session")
        .add_header(AUTHORIZATION, bearer(TOKEN))
        .await;
    let body: Value = response.json();
    assert_eq!(body["data"]["ended"], true);

    let response = server
        .get("/api/v1/watchlist")
        .add_header(AUTHORIZATION, bearer(TOKEN))
        .await;
    let body: Value = response.json();
    assert_eq!(body["redirect"]["name"], "login");
}

#[tokio::test]
async fn test_store_failure_on_toggle_is_bad_gateway() {
    let state = create_app_state(Arc::new(RejectingWatchlistStore::default()));
    let server = TestServer::new(create_router(state)).unwrap();
    sign_in(&server).await;

    let response = server
        .post("/api/v1/watchlist/toggle")
        .add_header(AUTHORIZATION, bearer(TOKEN))
        .json(&json!({ "content_id": 4 }))
        .await;

    response.assert_status(StatusCode::BAD_GATEWAY);
    let body: Value = response.json();
    assert_eq!(body["notifications"][0]["level"], "error");
    assert_eq!(body["notifications"][0]["message"], "Error updating your list");

    // The list is unchanged
    let response = server
        .get("/api/v1/watchlist")
        .add_header(AUTHORIZATION, bearer(TOKEN))
        .await;
    let body: Value = response.json();
    assert_eq!(body["data"]["stats"]["total"], 0);
}

#[tokio::test]
async fn test_idle_session_stops_authorizing() {
    let state = create_app_state(Arc::new(MemoryStore::new()))
        .with_session_idle_ttl(Duration::ZERO);
    let server = TestServer::new(create_router(state)).unwrap();
    sign_in(&server).await;

    let response = server
        .post("/api/v1/watchlist/toggle")
        .add_header(AUTHORIZATION, bearer(TOKEN))
        .json(&json!({ "content_id": 2 }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert!(body["data"].is_null());
    assert_eq!(body["redirect"]["name"], "login");
}
