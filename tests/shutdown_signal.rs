//! Raises a real SIGTERM at the test process, so it lives in its own test binary.

#![cfg(unix)]

use std::time::Duration;

use nix::sys::signal::{Signal, raise};
use tokio::sync::mpsc;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;

use timervisor::{Command, ShutdownCoordinator};

#[tokio::test]
async fn sigterm_becomes_shutdown_command() {
    let (tx, mut rx) = mpsc::channel(4);
    let token = CancellationToken::new();
    let task = ShutdownCoordinator::install()
        .unwrap()
        .spawn(tx, token.clone());

    raise(Signal::SIGTERM).unwrap();

    let cmd = timeout(Duration::from_secs(5), rx.recv()).await.unwrap();
    assert_eq!(cmd, Some(Command::Shutdown));
    task.await.unwrap();

    // Only the first signal is forwarded.
    assert_eq!(rx.recv().await, None);
}
