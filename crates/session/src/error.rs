use thiserror::Error;

/// Failure talking to the session backend.
///
/// Callers in the guard layer log these and carry on; none of them block
/// navigation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("identity provider error: {0}")]
    Provider(String),

    #[error("no active session")]
    NoSession,
}

impl SessionError {
    pub fn provider(msg: impl Into<String>) -> Self {
        Self::Provider(msg.into())
    }
}
