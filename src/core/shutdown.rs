//! # ShutdownCoordinator: OS signals to a shutdown request.
//!
//! Listens for termination signals and forwards them to the loop as
//! [`Command::Shutdown`]. No cleanup runs in the signal context: the loop
//! performs the stop protocol itself, under the same serialization as button
//! toggles and health polls.
//!
//! ## Signals
//! **Unix platforms:**
//! - `SIGINT` (Ctrl-C in terminal)
//! - `SIGTERM` (default kill signal, used by systemd)
//!
//! **Other platforms:**
//! - `Ctrl-C` via [`tokio::signal::ctrl_c`]

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::info;

use super::command::Command;
use crate::error::RuntimeError;

/// Registered termination-signal listeners.
pub struct ShutdownCoordinator {
    #[cfg(unix)]
    sigint: tokio::signal::unix::Signal,
    #[cfg(unix)]
    sigterm: tokio::signal::unix::Signal,
}

impl ShutdownCoordinator {
    /// Registers the signal handlers.
    ///
    /// Must be called inside a tokio runtime. Fails if the OS refuses the registration.
    #[cfg(unix)]
    pub fn install() -> Result<Self, RuntimeError> {
        use tokio::signal::unix::{SignalKind, signal};

        Ok(Self {
            sigint: signal(SignalKind::interrupt())?,
            sigterm: signal(SignalKind::terminate())?,
        })
    }

    /// Registers the signal handlers.
    #[cfg(not(unix))]
    pub fn install() -> Result<Self, RuntimeError> {
        Ok(Self {})
    }

    /// Waits for the first termination signal.
    #[cfg(unix)]
    pub async fn wait(&mut self) {
        tokio::select! {
            _ = self.sigint.recv()  => info!(signal = "SIGINT", "termination signal received"),
            _ = self.sigterm.recv() => info!(signal = "SIGTERM", "termination signal received"),
        }
    }

    /// Waits for the first termination signal.
    #[cfg(not(unix))]
    pub async fn wait(&mut self) {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!(signal = "ctrl-c", "termination signal received");
        }
    }

    /// Forwards the first signal to the loop as [`Command::Shutdown`].
    ///
    /// Exits without sending if `token` is cancelled first.
    pub fn spawn(mut self, commands: mpsc::Sender<Command>, token: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {}
                _ = self.wait() => {
                    let _ = commands.send(Command::Shutdown).await;
                }
            }
        })
    }
}
