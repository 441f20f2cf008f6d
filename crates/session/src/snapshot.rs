use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use warden_auth::UserProfile;
use warden_core::{SessionId, UserId};

/// Proof that someone is signed in.
///
/// The guards only test for presence; the fields are carried for the
/// identity backend and diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub id: SessionId,
    pub user_id: UserId,
    pub issued_at: DateTime<Utc>,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

impl Session {
    pub fn new(user_id: UserId, issued_at: DateTime<Utc>) -> Self {
        Self {
            id: SessionId::new(),
            user_id,
            issued_at,
            expires_at: None,
        }
    }
}

/// Point-in-time view of the session store.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SessionSnapshot {
    pub user: Option<Arc<UserProfile>>,
    pub session: Option<Session>,
    pub loading: bool,
}

impl SessionSnapshot {
    pub fn signed_in(user: UserProfile, session: Session) -> Self {
        Self {
            user: Some(Arc::new(user)),
            session: Some(session),
            loading: false,
        }
    }

    pub fn signed_out() -> Self {
        Self::default()
    }

    /// Both a profile and a session are present.
    pub fn is_signed_in(&self) -> bool {
        self.user.is_some() && self.session.is_some()
    }

    pub fn user(&self) -> Option<&UserProfile> {
        self.user.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signed_in_needs_both_halves() {
        let user_id = UserId::new();
        let session = Session::new(user_id, Utc::now());
        let profile = UserProfile::new(user_id);

        assert!(SessionSnapshot::signed_in(profile.clone(), session.clone()).is_signed_in());
        assert!(!SessionSnapshot::signed_out().is_signed_in());

        let profile_only = SessionSnapshot {
            user: Some(Arc::new(profile)),
            ..SessionSnapshot::default()
        };
        assert!(!profile_only.is_signed_in());

        let session_only = SessionSnapshot {
            session: Some(session),
            ..SessionSnapshot::default()
        };
        assert!(!session_only.is_signed_in());
    }
}
