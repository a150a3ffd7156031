use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Authenticated user as reported by the auth service
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: Uuid,
    #[serde(default)]
    pub email: Option<String>,
}

impl User {
    /// Username used for a freshly created profile: the email's local part
    pub fn derived_username(&self) -> String {
        match self.email.as_deref().and_then(|e| e.split('@').next()) {
            Some(local) if !local.is_empty() => local.to_string(),
            _ => format!("user-{}", &self.id.simple().to_string()[..8]),
        }
    }
}

/// Proof of authenticated identity for one page load
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub access_token: String,
    pub user: User,
}

/// Profile record kept in the store alongside the auth identity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, sqlx::FromRow)]
pub struct UserProfile {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub birth_date: Option<NaiveDate>,
    pub phone: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

impl UserProfile {
    /// Minimal profile for a user who has none yet
    pub fn minimal_for(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.derived_username(),
            email: user.email.clone().unwrap_or_default(),
            birth_date: None,
            phone: String::new(),
            role: "user".to_string(),
            created_at: Utc::now(),
        }
    }
}
