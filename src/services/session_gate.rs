use std::sync::Arc;

use crate::{
    services::feedback::{AuthViews, Feedback},
    session::UserSession,
};

/// State-changing or personal actions that require a held session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatedAction {
    Play,
    AddToList,
    MyList,
    Continue,
    Profile,
}

impl GatedAction {
    /// Completes the sentence "Sign in to ..."
    pub fn describe(&self) -> &'static str {
        match self {
            GatedAction::Play => "play content",
            GatedAction::AddToList => "add to your list",
            GatedAction::MyList => "view your personal list",
            GatedAction::Continue => "continue watching",
            GatedAction::Profile => "view your profile",
        }
    }

    pub fn sign_in_message(&self) -> String {
        format!("Sign in to {}", self.describe())
    }
}

/// Login wall in front of personal actions
#[derive(Clone)]
pub struct SessionGate {
    views: Arc<dyn AuthViews>,
}

impl SessionGate {
    pub fn new(views: Arc<dyn AuthViews>) -> Self {
        Self { views }
    }

    pub fn views(&self) -> &dyn AuthViews {
        self.views.as_ref()
    }

    /// Returns the held session, or sends the visitor to the login view with
    /// a message naming the blocked action.
    pub fn authorize<'s>(
        &self,
        session: Option<&'s UserSession>,
        action: GatedAction,
        feedback: &mut Feedback,
    ) -> Option<&'s UserSession> {
        if session.is_none() {
            tracing::debug!(action = ?action, "Action blocked: no session");
            feedback.redirect_to(self.views.login());
            feedback.info(action.sign_in_message());
        }
        session
    }

    pub fn require_session(
        &self,
        session: Option<&UserSession>,
        action: GatedAction,
        feedback: &mut Feedback,
    ) -> bool {
        self.authorize(session, action, feedback).is_some()
    }
}
