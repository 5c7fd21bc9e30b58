//! # Binary indicator outputs.
//!
//! [`Led`] is the on/off primitive the GPIO driver exposes. Two implementations
//! ship with the crate:
//! - [`MemoryLed`]: shared in-memory state, observable from other handles;
//! - [`LogLed`]: a virtual panel lamp that reports every change through `tracing`.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use tracing::info;

/// A single digital output driving an indicator.
///
/// Writes must be cheap and infallible from the supervisor's point of view;
/// a driver that can fail reports the failure itself.
pub trait Led: Send + 'static {
    /// Drives the output high (`true`) or low (`false`).
    fn set(&mut self, on: bool);

    /// Returns the last written level.
    fn is_on(&self) -> bool;

    fn on(&mut self) {
        self.set(true);
    }

    fn off(&mut self) {
        self.set(false);
    }

    fn toggle(&mut self) {
        let next = !self.is_on();
        self.set(next);
    }
}

/// In-memory LED. Clones share the same state.
#[derive(Clone, Debug, Default)]
pub struct MemoryLed {
    level: Arc<AtomicBool>,
    writes: Arc<AtomicU32>,
}

impl MemoryLed {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of writes performed so far (including writes that did not change the level).
    pub fn writes(&self) -> u32 {
        self.writes.load(Ordering::SeqCst)
    }
}

impl Led for MemoryLed {
    fn set(&mut self, on: bool) {
        self.level.store(on, Ordering::SeqCst);
        self.writes.fetch_add(1, Ordering::SeqCst);
    }

    fn is_on(&self) -> bool {
        self.level.load(Ordering::SeqCst)
    }
}

/// Virtual lamp that logs level changes.
#[derive(Debug)]
pub struct LogLed {
    label: &'static str,
    pin: u8,
    level: bool,
}

impl LogLed {
    #[must_use]
    pub fn new(label: &'static str, pin: u8) -> Self {
        Self {
            label,
            pin,
            level: false,
        }
    }
}

impl Led for LogLed {
    fn set(&mut self, on: bool) {
        if self.level != on {
            info!(led = self.label, pin = self.pin, on, "led changed");
        }
        self.level = on;
    }

    fn is_on(&self) -> bool {
        self.level
    }
}
