//! Response envelope shared by the page routes
//!
//! Every interaction answers with `{ data, notifications, redirect }` so the
//! page shell can show toasts and follow the gate's navigation. A blocked
//! action is not a failure: it returns 200 with `data: null` and a redirect.

use std::sync::Arc;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::request::Parts,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;

use crate::{
    error::AppError,
    middleware::AccessToken,
    services::feedback::{AuthView, Feedback, Notification},
    session::UserSession,
    state::AppState,
};

#[derive(Debug, Serialize)]
pub struct Page<T> {
    pub data: Option<T>,
    pub notifications: Vec<Notification>,
    pub redirect: Option<AuthView>,
}

impl<T: Serialize> Page<T> {
    pub fn new(data: Option<T>, feedback: Feedback) -> Self {
        Self {
            data,
            notifications: feedback.notifications,
            redirect: feedback.redirect,
        }
    }

    pub fn data(data: T) -> Self {
        Self::new(Some(data), Feedback::new())
    }
}

impl<T: Serialize> IntoResponse for Page<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

/// A failed interaction together with the notifications it queued
#[derive(Debug)]
pub struct PageError {
    pub error: AppError,
    pub feedback: Feedback,
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        let status = self.error.status_code();
        let body = Json(json!({
            "error": self.error.to_string(),
            "notifications": self.feedback.notifications,
        }));
        (status, body).into_response()
    }
}

pub type PageResult<T> = Result<Page<T>, PageError>;

/// Wraps an interaction result and its feedback into the envelope
pub fn respond<T: Serialize>(
    result: Result<Option<T>, AppError>,
    feedback: Feedback,
) -> PageResult<T> {
    match result {
        Ok(data) => Ok(Page::new(data, feedback)),
        Err(error) => Err(PageError { error, feedback }),
    }
}

/// Session started for the caller's token, if any
pub struct CurrentSession(pub Option<Arc<UserSession>>);

impl CurrentSession {
    pub fn as_deref(&self) -> Option<&UserSession> {
        self.0.as_deref()
    }
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentSession {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let session = match parts.extensions.get::<AccessToken>() {
            Some(token) => state.sessions.get(token.as_str()).await,
            None => None,
        };
        Ok(CurrentSession(session))
    }
}
