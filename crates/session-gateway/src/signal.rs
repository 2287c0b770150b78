//! Session-loss notification for the hosting application.
//!
//! The gateway never navigates anywhere itself. When the session is
//! unrecoverable it raises this signal and the application decides what
//! re-authentication looks like (redirect, prompt, exit).

use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Callback invoked once per lost session.
pub type SessionLossCallback = Arc<dyn Fn() + Send + Sync>;

/// One-shot-per-episode session-loss signal.
///
/// An episode ends when the session is restored (a successful renewal or a
/// new sign-in calls [`reset`](Self::reset)). Raising more than once within an
/// episode has no additional effect.
pub struct SessionLossSignal {
    raised: AtomicBool,
    fired: AtomicU64,
    listener: Mutex<Option<SessionLossCallback>>,
}

impl SessionLossSignal {
    pub fn new() -> Self {
        Self {
            raised: AtomicBool::new(false),
            fired: AtomicU64::new(0),
            listener: Mutex::new(None),
        }
    }

    /// Bind the application's reaction to a lost session.
    pub fn set_listener(&self, callback: SessionLossCallback) {
        *self.listener.lock() = Some(callback);
    }

    /// Raise the signal. Returns true only for the first raise of an episode.
    pub fn raise(&self) -> bool {
        if self.raised.swap(true, Ordering::AcqRel) {
            debug!("Session loss already signalled for this episode");
            return false;
        }

        let fired = self.fired.fetch_add(1, Ordering::AcqRel) + 1;
        warn!(fired, "Session lost, re-authentication required");

        // Clone out so the listener may rebind itself without deadlocking.
        let listener = self.listener.lock().clone();
        if let Some(callback) = listener {
            callback();
        }
        true
    }

    /// Whether the signal has been raised in the current episode.
    pub fn is_raised(&self) -> bool {
        self.raised.load(Ordering::Acquire)
    }

    /// Number of episodes in which the signal actually fired.
    pub fn raised_count(&self) -> u64 {
        self.fired.load(Ordering::Acquire)
    }

    /// Start a new episode after the session has been restored.
    pub fn reset(&self) {
        if self.raised.swap(false, Ordering::AcqRel) {
            info!("Session restored, session-loss signal re-armed");
        }
    }
}

impl Default for SessionLossSignal {
    fn default() -> Self {
        Self::new()
    }
}
