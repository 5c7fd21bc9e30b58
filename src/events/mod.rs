//! Runtime events: types and broadcast bus.
//!
//! ## Contents
//! - [`EventKind`], [`Event`], [`OutputStream`] event classification and payload metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! The supervisor loop publishes every state change here. The
//! `SubscriberSet` listener and [`SupervisorHandle::subscribe`](crate::SupervisorHandle::subscribe)
//! receive them.

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind, OutputStream};
