//! Pre-navigation guard for the protected section.

use std::sync::Arc;

use serde::Serialize;

use warden_auth::{PermissionRegistry, has_module_access};
use warden_core::{AccessError, AccessResult};
use warden_session::{SessionSnapshot, SessionStore};

use crate::{GuardConfig, Location, Redirect, RedirectTarget};

/// Where a single guard evaluation ended up.
///
/// `Uninitialized` and `Initializing` are transient; an outcome always carries
/// one of the three terminal states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GuardState {
    /// Before the first evaluation. Never reported in an outcome; it names
    /// the entry state of the state machine.
    Uninitialized,
    Initializing,
    Authorized,
    Unauthenticated,
    Forbidden,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GuardOutcome {
    pub state: GuardState,
    /// Where to go instead; `None` when navigation proceeds.
    pub redirect: Option<Redirect>,
}

impl GuardOutcome {
    pub fn is_allowed(&self) -> bool {
        self.state == GuardState::Authorized
    }
}

/// Route-level guard attached to the root of the protected section.
///
/// Re-evaluated on every navigation; nothing is cached between calls so a
/// changed session is reflected on the next navigation.
pub struct RouteGuard<S> {
    store: S,
    registry: Arc<PermissionRegistry>,
    config: Arc<GuardConfig>,
}

impl<S: SessionStore> RouteGuard<S> {
    pub fn new(store: S, config: GuardConfig) -> Self {
        Self {
            store,
            registry: PermissionRegistry::builtin(),
            config: Arc::new(config),
        }
    }

    pub fn with_registry(mut self, registry: Arc<PermissionRegistry>) -> Self {
        self.registry = registry;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &GuardConfig {
        &self.config
    }

    /// Decide whether navigation to `to` may proceed.
    pub async fn before_enter(&self, to: &Location) -> GuardOutcome {
        let outcome = match self.evaluate(to).await {
            Ok(()) => GuardOutcome {
                state: GuardState::Authorized,
                redirect: None,
            },
            Err(AccessError::Unauthenticated { redirect }) => GuardOutcome {
                state: GuardState::Unauthenticated,
                redirect: Some(
                    Redirect::to(self.config.sign_in_path.clone())
                        .with_query(self.config.redirect_param.clone(), redirect),
                ),
            },
            Err(AccessError::Forbidden { .. }) => GuardOutcome {
                state: GuardState::Forbidden,
                redirect: Some(Redirect::to(self.config.forbidden_path.clone())),
            },
            Err(AccessError::MalformedNavigation(msg)) => {
                tracing::debug!(%msg, "malformed navigation; sending to root");
                GuardOutcome {
                    state: GuardState::Forbidden,
                    redirect: Some(Redirect::to(RedirectTarget::ROOT)),
                }
            }
        };

        tracing::info!(path = %to.path, state = ?outcome.state, "route guard decision");
        outcome
    }

    async fn evaluate(&self, to: &Location) -> AccessResult<()> {
        let snapshot = self.settled_snapshot().await;

        let user = match (snapshot.user(), &snapshot.session) {
            (Some(user), Some(_)) => user,
            _ => {
                let target = RedirectTarget::from_location(to);
                return Err(AccessError::unauthenticated(target.into_string()));
            }
        };

        if let Some(key) = self.config.section_permission(&to.path) {
            if !has_module_access(&self.registry, user, key) {
                tracing::debug!(user_id = %user.id, %key, path = %to.path, "section not granted");
                return Err(AccessError::forbidden(key));
            }
        }

        Ok(())
    }

    /// Snapshot after any needed initialization has finished.
    ///
    /// A loading store is awaited (the store joins the in-flight call); a
    /// signed-out one is initialized once, covering a fresh page load where
    /// persisted state has not been rehydrated yet.
    async fn settled_snapshot(&self) -> SessionSnapshot {
        let snapshot = self.store.snapshot().await;
        if !snapshot.loading && snapshot.is_signed_in() {
            return snapshot;
        }

        tracing::debug!(
            state = ?GuardState::Initializing,
            loading = snapshot.loading,
            "waiting for session initialization"
        );
        self.store.initialize().await;
        self.store.snapshot().await
    }
}
