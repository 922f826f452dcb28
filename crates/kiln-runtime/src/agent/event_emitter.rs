//! Run event fan-out.
//!
//! The loop publishes [`AgentEvent`]s through a bounded broadcast channel.
//! Emission never suspends the orchestrator: with no subscribers the event
//! is dropped, and a subscriber that falls more than the channel capacity
//! behind observes a lag error on its receiver instead of stalling the
//! sender.

use kiln_core::events::AgentEvent;
use tokio::sync::broadcast;

/// Channel capacity; a subscriber lagging past this many events is dropped.
const CHANNEL_CAPACITY: usize = 1024;

/// Broadcasts [`AgentEvent`]s to any number of run subscribers.
pub struct EventEmitter {
    tx: broadcast::Sender<AgentEvent>,
}

impl EventEmitter {
    /// Emitter with the standard channel capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(CHANNEL_CAPACITY)
    }

    /// Emitter with an explicit channel capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Publish one event, returning how many subscribers saw it.
    pub fn emit(&self, event: AgentEvent) -> usize {
        match self.tx.send(event) {
            Ok(delivered) => delivered,
            Err(_) => 0,
        }
    }

    /// A receiver for every event emitted after this call.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<AgentEvent> {
        self.tx.subscribe()
    }
}

impl Default for EventEmitter {
    fn default() -> Self {
        Self::new()
    }
}
