//! `warden-session`: the session store the access guards consume.
//!
//! The guards depend on [`SessionStore`] only. [`SharedSessionStore`] is the
//! process-wide implementation backed by an [`IdentityProvider`]; tests and
//! embedders can substitute their own store.

pub mod error;
pub mod freshness;
pub mod provider;
pub mod snapshot;
pub mod store;

pub use error::SessionError;
pub use freshness::{DEFAULT_REFRESH_COOLDOWN, FreshnessPolicy, FreshnessWatcher, Visibility};
pub use provider::{IdentityProvider, StaticIdentityProvider};
pub use snapshot::{Session, SessionSnapshot};
pub use store::{SessionStore, SharedSessionStore};
