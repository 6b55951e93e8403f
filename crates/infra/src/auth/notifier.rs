//! Session change notification slot

use std::sync::Arc;

use parking_lot::RwLock;
use xauth_domain::SessionSnapshot;

/// Callback fired on login, refresh and logout: `(old, new, session_id)`
pub type SessionCallback =
    dyn Fn(Option<&SessionSnapshot>, Option<&SessionSnapshot>, &str) + Send + Sync;

/// Holds at most one subscriber
///
/// Registering a new callback replaces the previous one.
#[derive(Default)]
pub struct SessionNotifier {
    slot: RwLock<Option<Arc<SessionCallback>>>,
}

impl SessionNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set<F>(&self, callback: F)
    where
        F: Fn(Option<&SessionSnapshot>, Option<&SessionSnapshot>, &str) + Send + Sync + 'static,
    {
        *self.slot.write() = Some(Arc::new(callback));
    }

    pub fn clear(&self) {
        *self.slot.write() = None;
    }

    pub fn is_set(&self) -> bool {
        self.slot.read().is_some()
    }

    /// Invoke the subscriber, if any.
    ///
    /// The lock is released before the callback runs, so a callback may
    /// re-register or clear the slot.
    pub fn notify(
        &self,
        old: Option<&SessionSnapshot>,
        new: Option<&SessionSnapshot>,
        session_id: &str,
    ) {
        let callback = self.slot.read().clone();
        if let Some(callback) = callback {
            callback(old, new, session_id);
        }
    }
}

impl std::fmt::Debug for SessionNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionNotifier").field("subscribed", &self.is_set()).finish()
    }
}
