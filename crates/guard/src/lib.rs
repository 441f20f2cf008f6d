//! `warden-guard`: navigation and rendering gates for the admin console.
//!
//! [`RouteGuard`] runs before every navigation into the protected section and
//! keeps its decision consistent with the asynchronously initialized session.
//! The component guards re-check the same policy for partial UI.

pub mod component;
pub mod config;
pub mod location;
pub mod navigation;
pub mod route;

pub use component::{AccessNotice, ModuleGuard, PageGuard, Rendered, RoleGuard, with_page_guard};
pub use config::{ConfigError, GuardConfig, ProtectedSection};
pub use location::{Location, Redirect, RedirectTarget};
pub use navigation::{Navigator, sign_out};
pub use route::{GuardOutcome, GuardState, RouteGuard};
