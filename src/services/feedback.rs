use serde::Serialize;

/// Severity of a transient user-facing notification
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
}

/// An externally supplied view the page shell can navigate to
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct AuthView {
    pub name: &'static str,
    pub path: String,
}

/// Login, registration and profile views, resolved once at startup
pub trait AuthViews: Send + Sync {
    fn login(&self) -> AuthView;
    fn registration(&self) -> AuthView;
    fn profile(&self) -> AuthView;
}

/// Views hosted by the page shell at fixed paths
#[derive(Debug, Clone)]
pub struct HostedAuthViews {
    login_path: String,
    registration_path: String,
    profile_path: String,
}

impl HostedAuthViews {
    pub fn new(login_path: String, registration_path: String, profile_path: String) -> Self {
        Self {
            login_path,
            registration_path,
            profile_path,
        }
    }
}

impl Default for HostedAuthViews {
    fn default() -> Self {
        Self::new(
            "/login".to_string(),
            "/register".to_string(),
            "/profile".to_string(),
        )
    }
}

impl AuthViews for HostedAuthViews {
    fn login(&self) -> AuthView {
        AuthView {
            name: "login",
            path: self.login_path.clone(),
        }
    }

    fn registration(&self) -> AuthView {
        AuthView {
            name: "registration",
            path: self.registration_path.clone(),
        }
    }

    fn profile(&self) -> AuthView {
        AuthView {
            name: "profile",
            path: self.profile_path.clone(),
        }
    }
}

/// Side effects of one interaction that the page shell should show:
/// toast notifications and at most one navigation.
#[derive(Debug, Default, Serialize, PartialEq)]
pub struct Feedback {
    pub notifications: Vec<Notification>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect: Option<AuthView>,
}

impl Feedback {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notify(&mut self, level: NotificationLevel, message: impl Into<String>) {
        self.notifications.push(Notification {
            level,
            message: message.into(),
        });
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.notify(NotificationLevel::Info, message);
    }

    pub fn success(&mut self, message: impl Into<String>) {
        self.notify(NotificationLevel::Success, message);
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.notify(NotificationLevel::Error, message);
    }

    pub fn redirect_to(&mut self, view: AuthView) {
        self.redirect = Some(view);
    }

    pub fn is_empty(&self) -> bool {
        self.notifications.is_empty() && self.redirect.is_none()
    }
}
