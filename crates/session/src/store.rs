//! Session store contract and the process-wide implementation.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{RwLock, watch};

use warden_auth::UserProfile;

use crate::{IdentityProvider, Session, SessionError, SessionSnapshot};

/// What the guards need from a session store.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn snapshot(&self) -> SessionSnapshot;

    /// Rehydrate user and session from the backend.
    ///
    /// Concurrent callers share one in-flight initialization. Failures are
    /// logged; afterwards the snapshot tells the caller what it got.
    async fn initialize(&self);

    async fn refresh_profile(&self) -> Result<(), SessionError>;

    async fn sign_out(&self) -> Result<(), SessionError>;
}

#[async_trait]
impl<S: SessionStore + ?Sized> SessionStore for Arc<S> {
    async fn snapshot(&self) -> SessionSnapshot {
        (**self).snapshot().await
    }

    async fn initialize(&self) {
        (**self).initialize().await
    }

    async fn refresh_profile(&self) -> Result<(), SessionError> {
        (**self).refresh_profile().await
    }

    async fn sign_out(&self) -> Result<(), SessionError> {
        (**self).sign_out().await
    }
}

#[derive(Debug, Default)]
struct State {
    user: Option<Arc<UserProfile>>,
    session: Option<Session>,
    /// Bumped by every sign-out. Backend reads started under an older value
    /// are discarded.
    generation: u64,
}

/// Process-wide session store backed by an [`IdentityProvider`].
///
/// # Invariants
/// - At most one initialization is outstanding; the loading flag doubles as
///   the in-flight marker.
/// - The profile is last-writer-wins between `initialize` and
///   `refresh_profile`; both read the same provider.
/// - A sign-out is never undone by a fetch that was in flight when it ran.
pub struct SharedSessionStore<P> {
    provider: P,
    state: RwLock<State>,
    loading: watch::Sender<bool>,
}

/// Clears the loading flag when initialization ends, including when the
/// initializing future is dropped mid-flight.
struct LoadingGuard<'a>(&'a watch::Sender<bool>);

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.0.send_replace(false);
    }
}

impl<P: IdentityProvider> SharedSessionStore<P> {
    pub fn new(provider: P) -> Self {
        let (loading, _) = watch::channel(false);
        Self {
            provider,
            state: RwLock::new(State::default()),
            loading,
        }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    async fn load(&self) -> Result<Option<(Session, UserProfile)>, SessionError> {
        let Some(session) = self.provider.current_session().await? else {
            return Ok(None);
        };
        let profile = self.provider.fetch_profile(session.user_id).await?;
        Ok(Some((session, profile)))
    }
}

#[async_trait]
impl<P: IdentityProvider> SessionStore for SharedSessionStore<P> {
    async fn snapshot(&self) -> SessionSnapshot {
        let state = self.state.read().await;
        SessionSnapshot {
            user: state.user.clone(),
            session: state.session.clone(),
            loading: *self.loading.borrow(),
        }
    }

    async fn initialize(&self) {
        let mut in_flight = self.loading.subscribe();
        let started = self.loading.send_if_modified(|loading| {
            if *loading {
                false
            } else {
                *loading = true;
                true
            }
        });

        if !started {
            tracing::debug!("session initialization already in flight; awaiting it");
            let _ = in_flight.wait_for(|loading| !*loading).await;
            return;
        }

        let _guard = LoadingGuard(&self.loading);
        let generation = self.state.read().await.generation;
        match self.load().await {
            Ok(Some((session, profile))) => {
                let mut state = self.state.write().await;
                if state.generation != generation {
                    tracing::debug!(
                        user_id = %profile.id,
                        "signed out during initialization; discarding"
                    );
                    return;
                }
                tracing::info!(user_id = %profile.id, "session initialized");
                state.user = Some(Arc::new(profile));
                state.session = Some(session);
            }
            Ok(None) => {
                tracing::debug!("no persisted session");
                let mut state = self.state.write().await;
                state.user = None;
                state.session = None;
            }
            Err(e) => {
                tracing::warn!(error = %e, "session initialization failed");
            }
        }
    }

    async fn refresh_profile(&self) -> Result<(), SessionError> {
        let (user_id, generation) = {
            let state = self.state.read().await;
            let user_id = state.session.as_ref().map(|s| s.user_id);
            (user_id.ok_or(SessionError::NoSession)?, state.generation)
        };

        let profile = self.provider.fetch_profile(user_id).await?;

        let mut state = self.state.write().await;
        // Signed out (or switched user) while the fetch was in flight.
        if state.generation != generation
            || state.session.as_ref().map(|s| s.user_id) != Some(user_id)
        {
            return Err(SessionError::NoSession);
        }
        state.user = Some(Arc::new(profile));
        tracing::debug!(user_id = %user_id, "profile refreshed");
        Ok(())
    }

    async fn sign_out(&self) -> Result<(), SessionError> {
        {
            let mut state = self.state.write().await;
            state.user = None;
            state.session = None;
            state.generation += 1;
        }
        self.provider.sign_out().await
    }
}
