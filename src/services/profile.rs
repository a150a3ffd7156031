use crate::{
    db::DataStore,
    error::AppResult,
    models::{User, UserProfile},
    services::feedback::Feedback,
    session::UserSession,
};

/// Result of making sure a user has a profile row
#[derive(Debug, Clone, PartialEq)]
pub enum ProfileStatus {
    Existing(UserProfile),
    Created(UserProfile),
}

impl ProfileStatus {
    pub fn into_profile(self) -> UserProfile {
        match self {
            ProfileStatus::Existing(profile) | ProfileStatus::Created(profile) => profile,
        }
    }
}

/// Looks up the user's profile and inserts a minimal one when absent
pub async fn ensure_profile(store: &dyn DataStore, user: &User) -> AppResult<ProfileStatus> {
    if let Some(profile) = store.find_profile(user.id).await? {
        return Ok(ProfileStatus::Existing(profile));
    }

    tracing::info!(user_id = %user.id, "No profile found; creating one");
    let profile = UserProfile::minimal_for(user);
    store.insert_profile(&profile).await?;

    Ok(ProfileStatus::Created(profile))
}

/// Profile for a profile-dependent view, verified at most once per session
///
/// Returns `None` (with an error notification) when the profile can be
/// neither found nor created; the dependent view must not be shown.
pub async fn session_profile(
    store: &dyn DataStore,
    session: &UserSession,
    feedback: &mut Feedback,
) -> Option<UserProfile> {
    if let Some(profile) = session.profile().read().await.clone() {
        return Some(profile);
    }

    match ensure_profile(store, session.user()).await {
        Ok(status) => {
            if matches!(status, ProfileStatus::Created(_)) {
                feedback.success("Profile created. Please complete your information.");
            }
            let profile = status.into_profile();
            *session.profile().write().await = Some(profile.clone());
            Some(profile)
        }
        Err(e) => {
            tracing::error!(user_id = %session.user_id(), error = %e, "Profile bootstrap failed");
            feedback.error("Error accessing your profile");
            None
        }
    }
}
