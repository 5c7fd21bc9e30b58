//! # Subscribe: extension point for lifecycle events.
//!
//! Anything that wants to react to the supervisor (a log sink, a status
//! display, a crash counter) implements [`Subscribe`] and is registered through
//! [`SupervisorBuilder::with_subscribers`](crate::SupervisorBuilder::with_subscribers).

use async_trait::async_trait;

use crate::events::Event;

/// Hook for observing the supervisor's lifecycle events.
///
/// Implementations run on their own worker task, fed through a bounded queue,
/// so they may take their time without holding up the loop. Events a subscriber
/// cannot keep up with are dropped for it alone.
///
/// ```rust
/// use std::sync::atomic::{AtomicU32, Ordering};
///
/// use async_trait::async_trait;
/// use timervisor::{Event, EventKind, Subscribe};
///
/// #[derive(Default)]
/// struct CrashCounter(AtomicU32);
///
/// #[async_trait]
/// impl Subscribe for CrashCounter {
///     async fn on_event(&self, ev: &Event) {
///         if ev.kind == EventKind::ChildCrashed {
///             self.0.fetch_add(1, Ordering::Relaxed);
///         }
///     }
///
///     fn name(&self) -> &'static str {
///         "crash-counter"
///     }
/// }
/// ```
#[async_trait]
pub trait Subscribe: Send + Sync + 'static {
    /// Handles one event. Called in publication order.
    async fn on_event(&self, event: &Event);

    /// Label used in log records about this subscriber.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Queue depth of this subscriber's lane (at least 1).
    fn queue_capacity(&self) -> usize {
        256
    }
}
