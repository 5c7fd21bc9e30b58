//! # InputWatcher: button presses to toggle commands.
//!
//! ```text
//! ButtonSource::next_press() ──► debounce filter ──► Command::Toggle ──► loop
//! ```
//!
//! ## Rules
//! - One qualifying press produces exactly one `Toggle`.
//! - A press closer than `debounce` to the previous qualifying press is ignored.
//! - The watcher holds no process or indicator state.
//! - The watcher exits when the source ends, the loop is gone, or the token is cancelled.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::command::Command;
use crate::hardware::ButtonSource;

/// Turns debounced presses from a [`ButtonSource`] into toggle commands.
pub struct InputWatcher<B: ButtonSource> {
    source: B,
    debounce: Duration,
}

impl<B: ButtonSource> InputWatcher<B> {
    pub fn new(source: B, debounce: Duration) -> Self {
        Self { source, debounce }
    }

    /// Runs the watcher on its own task.
    pub fn spawn(self, commands: mpsc::Sender<Command>, token: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(self.run(commands, token))
    }

    /// Forwards qualifying presses until the source ends or `token` is cancelled.
    pub async fn run(mut self, commands: mpsc::Sender<Command>, token: CancellationToken) {
        let mut debounce = Debounce::new(self.debounce);
        info!("monitoring for button presses");

        loop {
            let press = tokio::select! {
                _ = token.cancelled() => break,
                press = self.source.next_press() => press,
            };
            let Some(at) = press else {
                debug!("button source closed");
                break;
            };
            if !debounce.accept(at) {
                debug!("press ignored (bounce)");
                continue;
            }
            if commands.send(Command::Toggle).await.is_err() {
                break;
            }
        }
    }
}

/// Minimum spacing filter between qualifying presses.
#[derive(Debug)]
struct Debounce {
    window: Duration,
    last: Option<Instant>,
}

impl Debounce {
    fn new(window: Duration) -> Self {
        Self { window, last: None }
    }

    fn accept(&mut self, at: Instant) -> bool {
        if let Some(last) = self.last {
            if at.saturating_duration_since(last) < self.window {
                return false;
            }
        }
        self.last = Some(at);
        true
    }
}
