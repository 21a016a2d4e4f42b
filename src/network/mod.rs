//! Simulated network connectivity signal
//!
//! The console does not observe a real link; online/offline transitions are
//! dispatched by the simulation commands and consumed by whoever subscribes
//! (the store's transition logger, the interceptor status).

use tokio::sync::watch;

/// Process-wide online/offline flag with change notification.
#[derive(Debug)]
pub struct NetworkMonitor {
    tx: watch::Sender<bool>,
}

impl NetworkMonitor {
    /// Starts online.
    pub fn new() -> Self {
        let (tx, _) = watch::channel(true);
        Self { tx }
    }

    pub fn is_online(&self) -> bool {
        *self.tx.borrow()
    }

    /// Flip the flag, notifying subscribers. Returns false when the flag
    /// already had that value (no transition dispatched).
    pub fn set_online(&self, online: bool) -> bool {
        if *self.tx.borrow() == online {
            return false;
        }
        self.tx.send_replace(online);
        true
    }

    /// Subscribe to transitions.
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }
}

impl Default for NetworkMonitor {
    fn default() -> Self {
        Self::new()
    }
}
