use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use warden_auth::UserProfile;
use warden_core::UserId;

use crate::{Session, SessionError};

/// Backend seam: wherever sessions and profiles actually come from.
///
/// Authentication itself (credentials, token issuance) happens behind this
/// trait and is not modelled here.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// The persisted session, if one exists.
    async fn current_session(&self) -> Result<Option<Session>, SessionError>;

    async fn fetch_profile(&self, user_id: UserId) -> Result<UserProfile, SessionError>;

    async fn sign_out(&self) -> Result<(), SessionError>;
}

/// In-memory provider holding at most one signed-in user.
///
/// Used by the diagnostic CLI and by tests.
#[derive(Debug, Default)]
pub struct StaticIdentityProvider {
    current: RwLock<Option<(Session, UserProfile)>>,
}

impl StaticIdentityProvider {
    pub fn signed_out() -> Self {
        Self::default()
    }

    pub fn signed_in(profile: UserProfile) -> Self {
        let session = Session::new(profile.id, Utc::now());
        Self {
            current: RwLock::new(Some((session, profile))),
        }
    }

    /// Replace the stored profile; the next fetch returns it.
    pub async fn set_profile(&self, profile: UserProfile) {
        let mut current = self.current.write().await;
        match current.as_mut() {
            Some((session, existing)) if session.user_id == profile.id => *existing = profile,
            _ => *current = Some((Session::new(profile.id, Utc::now()), profile)),
        }
    }
}

#[async_trait]
impl IdentityProvider for StaticIdentityProvider {
    async fn current_session(&self) -> Result<Option<Session>, SessionError> {
        Ok(self.current.read().await.as_ref().map(|(s, _)| s.clone()))
    }

    async fn fetch_profile(&self, user_id: UserId) -> Result<UserProfile, SessionError> {
        match self.current.read().await.as_ref() {
            Some((_, profile)) if profile.id == user_id => Ok(profile.clone()),
            _ => Err(SessionError::NoSession),
        }
    }

    async fn sign_out(&self) -> Result<(), SessionError> {
        *self.current.write().await = None;
        Ok(())
    }
}
