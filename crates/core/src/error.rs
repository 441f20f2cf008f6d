//! Access-failure taxonomy.

use thiserror::Error;

/// Result type used by guard evaluation.
pub type AccessResult<T> = Result<T, AccessError>;

/// Why a guarded navigation or subtree was not allowed to proceed.
///
/// None of these are fatal: every variant maps to a defined navigation or
/// rendering outcome at the guard layer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AccessError {
    /// No session after an initialization attempt. `redirect` is the sanitized
    /// return path to resume after signing in.
    #[error("unauthenticated (return to '{redirect}')")]
    Unauthenticated { redirect: String },

    /// Signed in, but the permission or module key is not granted.
    #[error("forbidden: '{key}' not granted")]
    Forbidden { key: String },

    /// The navigation state could not be turned into a usable path.
    #[error("malformed navigation state: {0}")]
    MalformedNavigation(String),
}

impl AccessError {
    pub fn unauthenticated(redirect: impl Into<String>) -> Self {
        Self::Unauthenticated {
            redirect: redirect.into(),
        }
    }

    pub fn forbidden(key: impl Into<String>) -> Self {
        Self::Forbidden { key: key.into() }
    }

    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedNavigation(msg.into())
    }
}

/// An identifier string failed to parse.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid identifier: {0}")]
pub struct InvalidId(pub String);
