//! Supabase (GoTrue) auth provider
//!
//! Validates access tokens with `GET {project}/auth/v1/user`. A 401/403 means
//! the token is not a live session; any other non-success status is an error.
use async_trait::async_trait;
use reqwest::{Client as HttpClient, StatusCode};
use tracing::instrument;

use crate::{
    error::{AppError, AppResult},
    models::{Session, User},
    services::auth::AuthService,
};

#[derive(Clone)]
pub struct SupabaseAuth {
    http_client: HttpClient,
    project_url: String,
    anon_key: String,
}

impl SupabaseAuth {
    pub fn new(project_url: String, anon_key: String) -> Self {
        Self {
            http_client: HttpClient::new(),
            project_url: project_url.trim_end_matches('/').to_string(),
            anon_key,
        }
    }

    fn user_endpoint(&self) -> String {
        format!("{}/auth/v1/user", self.project_url)
    }
}

#[async_trait]
impl AuthService for SupabaseAuth {
    #[instrument(skip_all)]
    async fn current_session(&self, access_token: &str) -> AppResult<Option<Session>> {
        if access_token.trim().is_empty() {
            return Ok(None);
        }

        let response = self
            .http_client
            .get(self.user_endpoint())
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token)
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => {
                let user: User = response.json().await?;
                tracing::debug!(user_id = %user.id, "Access token resolved");
                Ok(Some(Session {
                    access_token: access_token.to_string(),
                    user,
                }))
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                tracing::debug!("Access token rejected by auth service");
                Ok(None)
            }
            status => {
                let body = response.text().await.unwrap_or_default();
                tracing::error!(status = %status, body = %body, "Auth service request failed");
                Err(AppError::Auth(format!(
                    "Auth service returned status {}: {}",
                    status, body
                )))
            }
        }
    }

    fn name(&self) -> &'static str {
        "supabase"
    }
}
