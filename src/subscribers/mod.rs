//! # Event subscribers for the timervisor runtime.
//!
//! ```text
//!   Supervisor loop ── publish(Event) ──► Bus ──► listener ──► SubscriberSet
//!                                                                 │
//!                                                      ┌──────────┴──────────┐
//!                                                      ▼                     ▼
//!                                                  LogWriter              Custom
//! ```
//!
//! - [`Subscribe`]: the extension trait;
//! - [`SubscriberSet`]: per-subscriber queues and workers;
//! - [`LogWriter`]: `tracing` output of every event.

mod log;
mod set;
mod subscriber;

pub use log::LogWriter;
pub use set::SubscriberSet;
pub use subscriber::Subscribe;
