//! Routing-layer primitives the guards drive.

use warden_session::SessionStore;

use crate::{GuardConfig, Redirect};

/// The routing layer, as far as the guards are concerned.
pub trait Navigator {
    /// Client-side redirect; replaces the current entry.
    fn redirect(&self, to: &Redirect);

    /// Navigation-history "go back".
    fn back(&self);
}

/// Sign out and leave the protected section.
///
/// A rejected sign-out is logged; the user is sent to the sign-in entry point
/// either way.
pub async fn sign_out<S, N>(store: &S, navigator: &N, config: &GuardConfig)
where
    S: SessionStore + ?Sized,
    N: Navigator + ?Sized,
{
    if let Err(e) = store.sign_out().await {
        tracing::warn!(error = %e, "sign-out failed; leaving anyway");
    }
    navigator.redirect(&Redirect::to(config.sign_in_path.clone()));
}
