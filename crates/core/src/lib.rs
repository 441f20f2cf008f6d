//! `warden-core`: shared building blocks for the access-control crates.
//!
//! Identifiers and the access-failure taxonomy live here so that the policy,
//! session and guard layers agree on them without depending on each other.

pub mod error;
pub mod id;

pub use error::{AccessError, AccessResult, InvalidId};
pub use id::{SessionId, UserId};
