//! Background profile re-validation when the console regains focus.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::SessionStore;

pub const DEFAULT_REFRESH_COOLDOWN: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Foreground,
    Background,
}

/// Cooldown gate for profile refreshes.
///
/// The window is measured from the last refresh the gate let through, not
/// from the last event. A failed refresh still consumes its window.
#[derive(Debug, Clone)]
pub struct FreshnessPolicy {
    cooldown: Duration,
    last_attempt: Option<Instant>,
}

impl Default for FreshnessPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_REFRESH_COOLDOWN)
    }
}

impl FreshnessPolicy {
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            last_attempt: None,
        }
    }

    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    /// Whether a visibility change at `now` should trigger a refresh.
    /// Records the attempt when it does.
    pub fn on_visibility(&mut self, visibility: Visibility, now: Instant) -> bool {
        if visibility != Visibility::Foreground {
            return false;
        }
        if let Some(last) = self.last_attempt {
            if now.saturating_duration_since(last) < self.cooldown {
                return false;
            }
        }
        self.last_attempt = Some(now);
        true
    }
}

/// Background task that refreshes the session profile on foreground events.
///
/// Owned by the view that feeds it visibility events; dropping the watcher
/// aborts the task.
pub struct FreshnessWatcher {
    events: Option<mpsc::UnboundedSender<(Visibility, Instant)>>,
    handle: Option<JoinHandle<()>>,
}

impl FreshnessWatcher {
    /// Start the watcher. Must be called within a tokio runtime.
    pub fn spawn<S>(store: Arc<S>, mut policy: FreshnessPolicy) -> Self
    where
        S: SessionStore + ?Sized + 'static,
    {
        let (tx, mut rx) = mpsc::unbounded_channel::<(Visibility, Instant)>();

        let handle = tokio::spawn(async move {
            tracing::debug!(cooldown = ?policy.cooldown(), "freshness watcher started");

            while let Some((visibility, at)) = rx.recv().await {
                if !policy.on_visibility(visibility, at) {
                    continue;
                }
                if let Err(e) = store.refresh_profile().await {
                    tracing::warn!(error = %e, "background profile refresh failed");
                }
            }

            tracing::debug!("freshness watcher stopped");
        });

        Self {
            events: Some(tx),
            handle: Some(handle),
        }
    }

    /// Feed a visibility change. The event is timestamped now.
    pub fn notify(&self, visibility: Visibility) {
        if let Some(events) = &self.events {
            let _ = events.send((visibility, Instant::now()));
        }
    }

    /// Stop accepting events, finish the queued ones, and wait for the task.
    pub async fn shutdown(mut self) {
        self.events.take();
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }
}

impl Drop for FreshnessWatcher {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}
