//! # LogWriter: structured event logger
//!
//! A subscriber that forwards every [`Event`] to `tracing`, one line per event.
//!
//! ## Example output
//! ```text
//! INFO  self-test done, indicator stopped
//! INFO  toggle requested
//! INFO  starting timer cmd="/opt/timer/run.sh -logdir /tmp ..."
//! INFO  timer started pid=4242
//! DEBUG timer output pid=4242 stream="stdout" line="connected"
//! INFO  stopping timer pid=4242 grace_ms=5000
//! WARN  timer did not terminate in time, killing pid=4242
//! INFO  timer stopped pid=4242 how="killed"
//! WARN  timer terminated on its own pid=4242 code=Some(1)
//! INFO  shutdown requested
//! ```

use async_trait::async_trait;
use tracing::{debug, error, info, warn};

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Event logging subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let reason = e.reason.as_deref().unwrap_or("");
        match e.kind {
            EventKind::IndicatorSelfTest => info!("self-test done, indicator stopped"),
            EventKind::ToggleRequested => info!("toggle requested"),
            EventKind::ChildStarting => info!(cmd = reason, "starting timer"),
            EventKind::ChildStarted => info!(pid = ?e.pid, "timer started"),
            EventKind::SpawnFailed => error!(error = reason, "failed to start timer"),
            EventKind::ChildOutput => debug!(
                pid = ?e.pid,
                stream = e.stream.map(|s| s.as_str()).unwrap_or("?"),
                line = reason,
                "timer output"
            ),
            EventKind::StopRequested => info!(pid = ?e.pid, grace_ms = ?e.grace_ms, "stopping timer"),
            EventKind::GraceExceeded => {
                warn!(pid = ?e.pid, grace_ms = ?e.grace_ms, "timer did not terminate in time, killing")
            }
            EventKind::ChildStopped => info!(pid = ?e.pid, code = ?e.code, how = reason, "timer stopped"),
            EventKind::ChildCrashed => warn!(pid = ?e.pid, code = ?e.code, "timer terminated on its own"),
            EventKind::ShutdownRequested => info!("shutdown requested"),
            EventKind::ShutdownComplete => info!("shutdown complete"),
        }
    }

    fn name(&self) -> &'static str {
        "log-writer"
    }
}
