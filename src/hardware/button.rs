//! # Push-button inputs.
//!
//! [`ButtonSource`] is the async face of the GPIO driver's press notifications.
//!
//! - [`ChannelButton`] + [`ButtonTrigger`]: the trigger is a cloneable, sync
//!   handle a driver callback can call from its own thread;
//! - [`StdinButton`]: every line read from standard input counts as a press.

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::sync::mpsc;
use tokio::time::Instant;

/// Stream of button presses.
///
/// Returns `None` once the source is exhausted (driver gone, stdin closed).
#[async_trait]
pub trait ButtonSource: Send + 'static {
    /// Waits for the next press and returns the instant it was observed.
    async fn next_press(&mut self) -> Option<Instant>;
}

/// Channel-backed button fed by a [`ButtonTrigger`].
pub struct ChannelButton {
    rx: mpsc::Receiver<Instant>,
}

/// Sync handle injecting presses into a [`ChannelButton`].
#[derive(Clone, Debug)]
pub struct ButtonTrigger {
    tx: mpsc::Sender<Instant>,
}

impl ChannelButton {
    /// Creates a button and its trigger.
    ///
    /// Presses beyond `capacity` pending ones are dropped.
    #[must_use]
    pub fn new(capacity: usize) -> (Self, ButtonTrigger) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self { rx }, ButtonTrigger { tx })
    }
}

impl ButtonTrigger {
    /// Reports a press happening now.
    ///
    /// Never blocks. Returns `false` if the press was dropped.
    pub fn press(&self) -> bool {
        self.press_at(Instant::now())
    }

    /// Reports a press observed at `at`.
    pub fn press_at(&self, at: Instant) -> bool {
        self.tx.try_send(at).is_ok()
    }
}

#[async_trait]
impl ButtonSource for ChannelButton {
    async fn next_press(&mut self) -> Option<Instant> {
        self.rx.recv().await
    }
}

/// Console stand-in for the physical button.
pub struct StdinButton {
    lines: Lines<BufReader<Stdin>>,
}

impl StdinButton {
    #[must_use]
    pub fn new() -> Self {
        Self {
            lines: BufReader::new(tokio::io::stdin()).lines(),
        }
    }
}

impl Default for StdinButton {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ButtonSource for StdinButton {
    async fn next_press(&mut self) -> Option<Instant> {
        match self.lines.next_line().await {
            Ok(Some(_)) => Some(Instant::now()),
            Ok(None) | Err(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn trigger_feeds_button() {
        let (mut button, trigger) = ChannelButton::new(4);
        let at = Instant::now();
        assert!(trigger.press_at(at));
        assert_eq!(button.next_press().await, Some(at));
    }

    #[tokio::test]
    async fn dropping_triggers_ends_stream() {
        let (mut button, trigger) = ChannelButton::new(1);
        drop(trigger);
        assert_eq!(button.next_press().await, None);
    }

    #[tokio::test]
    async fn overflow_drops_press() {
        let (_button, trigger) = ChannelButton::new(1);
        assert!(trigger.press());
        assert!(!trigger.press());
    }
}
