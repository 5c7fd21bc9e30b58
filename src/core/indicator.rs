//! # IndicatorDriver: two-LED status state machine.
//!
//! ```text
//! Initializing ──initialize()──► Stopped ◄──set_stopped()── Running
//!                                   └────────set_running()────►┘
//! ```
//!
//! ## Rules
//! - `Initializing` is left exactly once, through the startup self-test.
//! - In `Stopped` and `Running` exactly one LED is lit.
//! - `set_running` / `set_stopped` are idempotent.
//! - A user stop and a crash-detected stop look the same.

use std::time::Duration;

use tokio::time;

use crate::hardware::Led;

/// Visible state of the status LEDs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndicatorState {
    /// Startup self-test has not finished yet.
    Initializing,
    /// "Stopped" LED lit, "running" LED dark.
    Stopped,
    /// "Running" LED lit, "stopped" LED dark.
    Running,
}

/// Drives the "running" and "stopped" LEDs.
pub struct IndicatorDriver {
    running: Box<dyn Led>,
    stopped: Box<dyn Led>,
    state: IndicatorState,
}

impl IndicatorDriver {
    /// Wraps both outputs. Nothing is written until [`initialize`](Self::initialize).
    pub fn new(running: Box<dyn Led>, stopped: Box<dyn Led>) -> Self {
        Self {
            running,
            stopped,
            state: IndicatorState::Initializing,
        }
    }

    #[inline]
    pub fn state(&self) -> IndicatorState {
        self.state
    }

    /// Runs the self-test: both LEDs off, then toggled together `blinks` times
    /// with `interval` after each toggle, then settles in `Stopped`.
    ///
    /// Only the first call does anything.
    pub async fn initialize(&mut self, blinks: u32, interval: Duration) {
        if self.state != IndicatorState::Initializing {
            return;
        }
        self.running.off();
        self.stopped.off();
        for _ in 0..blinks {
            self.running.toggle();
            self.stopped.toggle();
            time::sleep(interval).await;
        }
        self.apply(IndicatorState::Stopped);
    }

    /// Lights the "running" LED.
    pub fn set_running(&mut self) {
        self.apply(IndicatorState::Running);
    }

    /// Lights the "stopped" LED.
    pub fn set_stopped(&mut self) {
        self.apply(IndicatorState::Stopped);
    }

    fn apply(&mut self, state: IndicatorState) {
        let running = state == IndicatorState::Running;
        self.running.set(running);
        self.stopped.set(!running);
        self.state = state;
    }
}
