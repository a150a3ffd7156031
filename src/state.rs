use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;

use crate::{
    db::DataStore,
    services::{
        auth::AuthService, catalog::Catalog, feedback::AuthViews, interactions::Interactions,
    },
    session::SessionRegistry,
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<dyn AuthService>,
    pub store: Arc<dyn DataStore>,
    pub catalog: Arc<RwLock<Catalog>>,
    pub sessions: SessionRegistry,
    pub interactions: Interactions,
}

impl AppState {
    pub fn new(
        auth: Arc<dyn AuthService>,
        store: Arc<dyn DataStore>,
        catalog: Catalog,
        views: Arc<dyn AuthViews>,
    ) -> Self {
        let catalog = Arc::new(RwLock::new(catalog));
        Self {
            interactions: Interactions::new(store.clone(), catalog.clone(), views),
            sessions: SessionRegistry::new(),
            auth,
            store,
            catalog,
        }
    }

    /// Replaces the session registry with one using the given idle expiry
    pub fn with_session_idle_ttl(mut self, idle_ttl: Duration) -> Self {
        self.sessions = SessionRegistry::with_idle_ttl(idle_ttl);
        self
    }
}
