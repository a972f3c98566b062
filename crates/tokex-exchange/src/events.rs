//! Event log and broadcast fan-out.
//!
//! Every committed operation appends exactly one [`ExchangeEvent`] to the
//! log and broadcasts it to live subscribers. Failed operations publish
//! nothing.

use tokex_types::ExchangeEvent;
use tokex_types::constants::EVENT_CHANNEL_CAPACITY;
use tokio::sync::broadcast;

#[derive(Debug)]
pub struct EventBus {
    log: Vec<ExchangeEvent>,
    sender: broadcast::Sender<ExchangeEvent>,
}

impl EventBus {
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(EVENT_CHANNEL_CAPACITY)
    }

    /// `capacity` bounds how far a subscriber may fall behind before it
    /// starts missing events.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            log: Vec::new(),
            sender,
        }
    }

    /// Append `event` to the log and broadcast it to live subscribers.
    pub fn publish(&mut self, event: ExchangeEvent) {
        tracing::trace!(event = event.name(), order = ?event.order_id(), "Event published");
        // No receivers is not an error.
        let _ = self.sender.send(event.clone());
        self.log.push(event);
    }

    /// Receive every event published from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<ExchangeEvent> {
        self.sender.subscribe()
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Events since creation or the last [`drain`](Self::drain).
    #[must_use]
    pub fn events(&self) -> &[ExchangeEvent] {
        &self.log
    }

    pub fn drain(&mut self) -> Vec<ExchangeEvent> {
        std::mem::take(&mut self.log)
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
