//! # Event bus for broadcasting runtime events.
//!
//! [`Bus`] wraps [`tokio::sync::broadcast`]. The supervisor loop is the only
//! publisher; the subscriber listener and any test or embedding code may
//! receive.
//!
//! ```text
//!   Supervisor loop ──► Bus ──┬──► subscriber listener ──► SubscriberSet
//!                             └──► Bus::subscribe() (tests, embedders)
//! ```
//!
//! ## Rules
//! - `publish()` never blocks.
//! - Slow receivers get `RecvError::Lagged(n)` and skip `n` oldest items.
//! - Events are lost if nobody is subscribed at send time.

use tokio::sync::broadcast;

use super::event::Event;

/// Broadcast channel for runtime events.
///
/// Cheap to clone (holds an `Arc`-backed sender).
#[derive(Clone, Debug)]
pub struct Bus {
    tx: broadcast::Sender<Event>,
}

impl Bus {
    /// Creates a new bus with the given channel capacity (clamped to at least 1).
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel::<Event>(capacity.max(1));
        Self { tx }
    }

    /// Publishes an event to all active receivers.
    pub fn publish(&self, ev: Event) {
        let _ = self.tx.send(ev);
    }

    /// Creates a receiver that observes events sent after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }
}
