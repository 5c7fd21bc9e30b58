//! # SubscriberSet: per-subscriber delivery lanes.
//!
//! Each registered [`Subscribe`] gets a lane: a bounded queue and one worker
//! task draining it. The supervisor loop hands events to the set through
//! [`SubscriberSet::emit`], which only enqueues, so a slow or stuck subscriber
//! can never delay a button toggle or a health poll.
//!
//! ```text
//!   listener ── emit(&Event) ──┬──► lane "log-writer" ──► worker ──► on_event()
//!                              └──► lane "custom"     ──► worker ──► on_event()
//! ```
//!
//! Delivery is FIFO within a lane. A full lane drops the event for that
//! subscriber only and counts the loss; a panicking subscriber is logged and
//! keeps receiving later events.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use futures::FutureExt;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

use super::Subscribe;
use crate::events::Event;

struct Lane {
    name: &'static str,
    queue: mpsc::Sender<Arc<Event>>,
    dropped: AtomicU64,
    worker: JoinHandle<()>,
}

/// Fan-out of events to a fixed list of subscribers.
pub struct SubscriberSet {
    lanes: Vec<Lane>,
}

impl SubscriberSet {
    /// Opens one lane per subscriber. Must be called inside a tokio runtime.
    #[must_use]
    pub fn new(subs: Vec<Arc<dyn Subscribe>>) -> Self {
        let lanes = subs.into_iter().map(open_lane).collect();
        Self { lanes }
    }

    /// Enqueues `event` on every lane without waiting.
    pub fn emit(&self, event: &Event) {
        let shared = Arc::new(event.clone());
        for lane in &self.lanes {
            let cause = match lane.queue.try_send(Arc::clone(&shared)) {
                Ok(()) => continue,
                Err(TrySendError::Full(_)) => "queue full",
                Err(TrySendError::Closed(_)) => "worker gone",
            };
            let total = lane.dropped.fetch_add(1, Ordering::Relaxed) + 1;
            warn!(subscriber = lane.name, cause, dropped = total, kind = ?event.kind, "event not delivered");
        }
    }

    /// Closes every lane and waits until the workers have drained their queues.
    pub async fn shutdown(self) {
        for Lane {
            name,
            queue,
            dropped,
            worker,
        } in self.lanes
        {
            drop(queue);
            let _ = worker.await;
            let dropped = dropped.into_inner();
            if dropped > 0 {
                debug!(subscriber = name, dropped, "lane closed with losses");
            }
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lanes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lanes.is_empty()
    }
}

fn open_lane(sub: Arc<dyn Subscribe>) -> Lane {
    let name = sub.name();
    let (queue, rx) = mpsc::channel(sub.queue_capacity().max(1));
    Lane {
        name,
        queue,
        dropped: AtomicU64::new(0),
        worker: tokio::spawn(drain_lane(sub, rx)),
    }
}

async fn drain_lane(sub: Arc<dyn Subscribe>, mut rx: mpsc::Receiver<Arc<Event>>) {
    while let Some(ev) = rx.recv().await {
        let delivery = std::panic::AssertUnwindSafe(sub.on_event(&ev)).catch_unwind();
        if let Err(panic) = delivery.await {
            error!(subscriber = sub.name(), kind = ?ev.kind, panic = ?panic, "subscriber panicked");
        }
    }
}
