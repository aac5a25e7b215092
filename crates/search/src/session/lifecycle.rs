//! Session lifecycle notifications.
//!
//! Whoever owns session lifecycle implements [`SessionLifecycle`]; the result
//! cache registers one callback per session through it and drops that
//! session's entries when the callback fires. [`SessionRegistry`] is an
//! in-process implementation.

use std::collections::HashMap;

use parking_lot::Mutex;

use super::context::SessionToken;

/// Callback invoked once when a session ends.
pub type SessionEndCallback = Box<dyn FnOnce(&SessionToken) + Send + 'static>;

/// Source of session-end notifications.
pub trait SessionLifecycle: Send + Sync {
    /// Registers `callback` to run when `session` ends.
    fn on_session_end(&self, session: &SessionToken, callback: SessionEndCallback);
}

/// In-process session registry.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicBool, Ordering};
/// use labbase_search::session::{SessionLifecycle, SessionRegistry, SessionToken};
///
/// let registry = SessionRegistry::new();
/// let token = SessionToken::new("s1");
/// let fired = Arc::new(AtomicBool::new(false));
/// let flag = fired.clone();
///
/// registry.on_session_end(&token, Box::new(move |_| flag.store(true, Ordering::SeqCst)));
/// assert_eq!(registry.end_session(&token), 1);
/// assert!(fired.load(Ordering::SeqCst));
/// ```
#[derive(Default)]
pub struct SessionRegistry {
    listeners: Mutex<HashMap<SessionToken, Vec<SessionEndCallback>>>,
}

impl SessionRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Ends a session, firing its callbacks. Returns how many fired.
    pub fn end_session(&self, session: &SessionToken) -> usize {
        // Callbacks run outside the lock: they may call back into their owners.
        let callbacks = self.listeners.lock().remove(session).unwrap_or_default();
        let fired = callbacks.len();
        for callback in callbacks {
            callback(session);
        }
        tracing::debug!(session = %session, listeners = fired, "session ended");
        fired
    }

    /// Returns the number of callbacks registered for `session`.
    pub fn listener_count(&self, session: &SessionToken) -> usize {
        self.listeners.lock().get(session).map_or(0, Vec::len)
    }
}

impl SessionLifecycle for SessionRegistry {
    fn on_session_end(&self, session: &SessionToken, callback: SessionEndCallback) {
        self.listeners
            .lock()
            .entry(session.clone())
            .or_default()
            .push(callback);
    }
}
