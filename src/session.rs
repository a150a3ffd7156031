//! Per-page-load session state
//!
//! A [`UserSession`] exists only while an authenticated session is held, so
//! code that takes `&UserSession` cannot run for anonymous visitors. The
//! registry maps access tokens to sessions started by an explicit page load
//! and drops them on teardown.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    db::DataStore,
    error::AppResult,
    models::{HistoryMirror, Session, User, UserProfile, WatchlistMirror},
    services::auth::AuthService,
};

pub struct UserSession {
    session: Session,
    watchlist: RwLock<WatchlistMirror>,
    history: RwLock<HistoryMirror>,
    profile: RwLock<Option<UserProfile>>,
}

impl UserSession {
    pub fn new(session: Session, watchlist: WatchlistMirror, history: HistoryMirror) -> Self {
        Self {
            session,
            watchlist: RwLock::new(watchlist),
            history: RwLock::new(history),
            profile: RwLock::new(None),
        }
    }

    /// Builds the session and fills both mirrors from the store
    ///
    /// A failed load leaves that mirror empty; the page still renders.
    pub async fn load(session: Session, store: &dyn DataStore) -> Self {
        let user_id = session.user.id;

        let watchlist = match store.list_watchlist(user_id).await {
            Ok(entries) => WatchlistMirror::new(entries),
            Err(e) => {
                tracing::error!(user_id = %user_id, error = %e, "Failed to load watchlist");
                WatchlistMirror::default()
            }
        };

        let history = match store.list_history(user_id).await {
            Ok(entries) => HistoryMirror::new(entries),
            Err(e) => {
                tracing::error!(user_id = %user_id, error = %e, "Failed to load history");
                HistoryMirror::default()
            }
        };

        tracing::info!(
            user_id = %user_id,
            watchlist_count = watchlist.len(),
            history_count = history.entries().len(),
            "Session loaded"
        );

        Self::new(session, watchlist, history)
    }

    pub fn user(&self) -> &User {
        &self.session.user
    }

    pub fn user_id(&self) -> Uuid {
        self.session.user.id
    }

    pub fn watchlist(&self) -> &RwLock<WatchlistMirror> {
        &self.watchlist
    }

    pub fn history(&self) -> &RwLock<HistoryMirror> {
        &self.history
    }

    /// Profile confirmed to exist in the store during this session
    pub fn profile(&self) -> &RwLock<Option<UserProfile>> {
        &self.profile
    }
}

/// Idle time after which a started session is dropped
pub const DEFAULT_SESSION_IDLE_TTL: Duration = Duration::from_secs(30 * 60);

struct RegisteredSession {
    session: Arc<UserSession>,
    expires_at: Instant,
}

impl RegisteredSession {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at <= now
    }
}

/// Sessions started by page loads, keyed by access token
///
/// Each entry expires after `idle_ttl` without use. An expired token no
/// longer resolves and must go through [`SessionRegistry::start`] again,
/// which re-validates it with the auth service.
#[derive(Clone)]
pub struct SessionRegistry {
    sessions: Arc<RwLock<HashMap<String, RegisteredSession>>>,
    idle_ttl: Duration,
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::with_idle_ttl(DEFAULT_SESSION_IDLE_TTL)
    }
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_idle_ttl(idle_ttl: Duration) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            idle_ttl,
        }
    }

    /// Page load: asks the auth service for the token's session and, if one
    /// is held, replaces any previous state for the token with fresh mirrors.
    /// Expired entries for other tokens are swept here.
    pub async fn start(
        &self,
        access_token: &str,
        auth: &dyn AuthService,
        store: &dyn DataStore,
    ) -> AppResult<Option<Arc<UserSession>>> {
        self.sweep_expired().await;

        let Some(session) = auth.current_session(access_token).await? else {
            self.end(access_token).await;
            tracing::info!(provider = auth.name(), "No session held; browsing anonymously");
            return Ok(None);
        };

        let user_session = Arc::new(UserSession::load(session, store).await);
        self.sessions.write().await.insert(
            access_token.to_string(),
            RegisteredSession {
                session: user_session.clone(),
                expires_at: Instant::now() + self.idle_ttl,
            },
        );

        Ok(Some(user_session))
    }

    /// Live session for the token; use extends its expiry, an expired entry is dropped
    pub async fn get(&self, access_token: &str) -> Option<Arc<UserSession>> {
        let now = Instant::now();
        let mut sessions = self.sessions.write().await;

        if sessions.get(access_token)?.is_expired(now) {
            sessions.remove(access_token);
            tracing::debug!("Session expired; browsing anonymously");
            return None;
        }

        let entry = sessions.get_mut(access_token)?;
        entry.expires_at = now + self.idle_ttl;
        Some(entry.session.clone())
    }

    /// Teardown; returns whether a session was held
    pub async fn end(&self, access_token: &str) -> bool {
        self.sessions.write().await.remove(access_token).is_some()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    async fn sweep_expired(&self) {
        let now = Instant::now();
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, entry| !entry.is_expired(now));

        let dropped = before - sessions.len();
        if dropped > 0 {
            tracing::debug!(dropped, "Expired sessions swept");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MockDataStore;
    use crate::error::AppError;
    use crate::models::{ContentId, ContentKind, WatchlistToggle};
    use crate::services::auth::MockAuthService;

    fn session_for(user_id: Uuid) -> Session {
        Session {
            access_token: "token-1".to_string(),
            user: User {
                id: user_id,
                email: Some("viewer@example.com".to_string()),
            },
        }
    }

    #[tokio::test]
    async fn test_start_loads_mirrors() {
        let user_id = Uuid::new_v4();
        let mut auth = MockAuthService::new();
        auth.expect_current_session()
            .returning(move |_| Ok(Some(session_for(user_id))));

        let mut store = MockDataStore::new();
        store.expect_list_watchlist().times(1).returning(move |uid| {
            Ok(vec![WatchlistToggle {
                content_id: ContentId(3),
                kind: ContentKind::Movie,
                title: "Future Sci-Fi".to_string(),
                poster_url: String::new(),
            }
            .into_entry(uid)])
        });
        store
            .expect_list_history()
            .times(1)
            .returning(|_| Ok(vec![]));

        let registry = SessionRegistry::new();
        let session = registry
            .start("token-1", &auth, &store)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(session.user_id(), user_id);
        assert!(session.watchlist().read().await.contains(ContentId(3)));
        assert!(registry.get("token-1").await.is_some());
    }

    #[tokio::test]
    async fn test_start_without_session_is_anonymous() {
        let mut auth = MockAuthService::new();
        auth.expect_current_session().returning(|_| Ok(None));
        auth.expect_name().return_const("mock");
        let store = MockDataStore::new();

        let registry = SessionRegistry::new();
        let session = registry.start("expired", &auth, &store).await.unwrap();

        assert!(session.is_none());
        assert_eq!(registry.len().await, 0);
    }

    #[tokio::test]
    async fn test_mirror_load_failure_leaves_mirror_empty() {
        let user_id = Uuid::new_v4();
        let mut auth = MockAuthService::new();
        auth.expect_current_session()
            .returning(move |_| Ok(Some(session_for(user_id))));

        let mut store = MockDataStore::new();
        store
            .expect_list_watchlist()
            .returning(|_| Err(AppError::Store("timeout".to_string())));
        store.expect_list_history().returning(|_| Ok(vec![]));

        let registry = SessionRegistry::new();
        let session = registry
            .start("token-1", &auth, &store)
            .await
            .unwrap()
            .unwrap();
        assert!(session.watchlist().read().await.is_empty());
    }

    #[tokio::test]
    async fn test_end_tears_down() {
        let user_id = Uuid::new_v4();
        let mut auth = MockAuthService::new();
        auth.expect_current_session()
            .returning(move |_| Ok(Some(session_for(user_id))));
        let mut store = MockDataStore::new();
        store.expect_list_watchlist().returning(|_| Ok(vec![]));
        store.expect_list_history().returning(|_| Ok(vec![]));

        let registry = SessionRegistry::new();
        registry.start("token-1", &auth, &store).await.unwrap();

        assert!(registry.end("token-1").await);
        assert!(!registry.end("token-1").await);
        assert!(registry.get("token-1").await.is_none());
    }

    fn auth_for(user_id: Uuid) -> MockAuthService {
        let mut auth = MockAuthService::new();
        auth.expect_current_session()
            .returning(move |_| Ok(Some(session_for(user_id))));
        auth
    }

    fn empty_store() -> MockDataStore {
        let mut store = MockDataStore::new();
        store.expect_list_watchlist().returning(|_| Ok(vec![]));
        store.expect_list_history().returning(|_| Ok(vec![]));
        store
    }

    #[tokio::test]
    async fn test_expired_token_no_longer_resolves() {
        let auth = auth_for(Uuid::new_v4());
        let store = empty_store();

        let registry = SessionRegistry::with_idle_ttl(Duration::ZERO);
        registry.start("token-1", &auth, &store).await.unwrap();
        assert_eq!(registry.len().await, 1);

        assert!(registry.get("token-1").await.is_none());
        assert_eq!(registry.len().await, 0);
    }

    #[tokio::test]
    async fn test_start_sweeps_expired_sessions() {
        let auth = auth_for(Uuid::new_v4());
        let store = empty_store();

        let registry = SessionRegistry::with_idle_ttl(Duration::ZERO);
        for i in 0..100 {
            registry
                .start(&format!("rotated-{}", i), &auth, &store)
                .await
                .unwrap();
        }

        // Only the most recent start survives the sweeps
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test]
    async fn test_live_session_resolves_until_idle() {
        let auth = auth_for(Uuid::new_v4());
        let store = empty_store();

        let registry = SessionRegistry::with_idle_ttl(Duration::from_secs(60));
        registry.start("token-1", &auth, &store).await.unwrap();

        assert!(registry.get("token-1").await.is_some());
        assert!(registry.get("token-1").await.is_some());
        assert_eq!(registry.len().await, 1);
    }
}
