//! Authentication service abstraction
//!
//! The page never authenticates users itself; it asks a hosted auth service
//! who the bearer of an access token is.
use async_trait::async_trait;

use crate::{
    error::AppResult,
    models::{Session, User},
};

pub mod supabase;

pub use supabase::SupabaseAuth;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Session for the token, or `None` when the token is missing, expired or revoked
    async fn current_session(&self, access_token: &str) -> AppResult<Option<Session>>;

    /// User for the token, or `None` when there is no valid session
    async fn current_user(&self, access_token: &str) -> AppResult<Option<User>> {
        Ok(self
            .current_session(access_token)
            .await?
            .map(|session| session.user))
    }

    /// Provider name for logging
    fn name(&self) -> &'static str;
}
