//! In-process stand-in for the external interceptor
//!
//! Implements the control surface only: active flag, pending counter, and the
//! online flag read from the network monitor. It runs no retry, backoff, or
//! queueing policy. Tests and demos drive its event channel explicitly
//! through [`SimInterceptor::emit`].

use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

use super::{InterceptorError, InterceptorEvent, InterceptorStatus, RetryInterceptor};
use crate::config::InterceptorConfig;
use crate::network::NetworkMonitor;

#[derive(Debug, Default)]
struct SimState {
    active: bool,
    pending: u32,
    config: Option<InterceptorConfig>,
    events: Option<mpsc::Sender<InterceptorEvent>>,
}

/// Simulated interceptor control surface.
pub struct SimInterceptor {
    network: Arc<NetworkMonitor>,
    state: Mutex<SimState>,
}

impl SimInterceptor {
    pub fn new(network: Arc<NetworkMonitor>) -> Self {
        Self {
            network,
            state: Mutex::new(SimState::default()),
        }
    }

    /// The config the interceptor was activated with, if active.
    pub fn active_config(&self) -> Option<InterceptorConfig> {
        self.state.lock().unwrap().config.clone()
    }

    /// Simulation knob: set the reported pending-queue depth.
    pub fn set_pending(&self, pending: u32) {
        self.state.lock().unwrap().pending = pending;
    }

    /// Simulation knob: push an event onto the registered channel.
    ///
    /// Returns false when inactive or when the receiver has been dropped.
    pub async fn emit(&self, event: InterceptorEvent) -> bool {
        let sender = {
            let state = self.state.lock().unwrap();
            if !state.active {
                return false;
            }
            state.events.clone()
        };
        match sender {
            Some(tx) => tx.send(event).await.is_ok(),
            None => false,
        }
    }
}

#[async_trait]
impl RetryInterceptor for SimInterceptor {
    async fn activate(
        &self,
        config: InterceptorConfig,
        events: mpsc::Sender<InterceptorEvent>,
    ) -> Result<(), InterceptorError> {
        let mut state = self.state.lock().unwrap();
        if state.active {
            return Err(InterceptorError::AlreadyActive);
        }
        state.active = true;
        state.config = Some(config);
        state.events = Some(events);
        Ok(())
    }

    async fn deactivate(&self) -> Result<(), InterceptorError> {
        let mut state = self.state.lock().unwrap();
        if !state.active {
            return Err(InterceptorError::NotActive);
        }
        state.active = false;
        state.pending = 0;
        state.config = None;
        // Dropping the sender closes the event channel
        state.events = None;
        Ok(())
    }

    async fn status(&self) -> InterceptorStatus {
        let state = self.state.lock().unwrap();
        InterceptorStatus {
            is_active: state.active,
            is_online: self.network.is_online(),
            pending_requests: state.pending,
        }
    }

    async fn count_pending(&self) -> u32 {
        self.state.lock().unwrap().pending
    }

    async fn clear_pending(&self) -> u32 {
        let mut state = self.state.lock().unwrap();
        std::mem::take(&mut state.pending)
    }
}
