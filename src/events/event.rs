//! # Runtime events emitted by the supervisor loop.
//!
//! The [`EventKind`] enum classifies event types across three categories:
//! - **Input events**: self-test and toggle requests
//! - **Child lifecycle events**: spawn, output, stop, crash
//! - **Shutdown events**: signal observed, loop finished
//!
//! The [`Event`] struct carries additional metadata such as timestamps, child pid,
//! exit code, reasons and output lines.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//!
//! ## Example
//! ```rust
//! use timervisor::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::ChildCrashed)
//!     .with_pid(4242)
//!     .with_code(Some(3));
//!
//! assert_eq!(ev.kind, EventKind::ChildCrashed);
//! assert_eq!(ev.pid, Some(4242));
//! assert_eq!(ev.code, Some(3));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::{Duration, SystemTime};

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Input events ===
    /// Startup LED self-test finished; indicator settled in `Stopped`.
    IndicatorSelfTest,

    /// A qualifying button press reached the loop.
    ToggleRequested,

    // === Child lifecycle events ===
    /// A launch is about to happen.
    ///
    /// Sets:
    /// - `reason`: rendered command line (password masked)
    ChildStarting,

    /// The timer process is running.
    ///
    /// Sets:
    /// - `pid`: process id
    ChildStarted,

    /// The timer process could not be launched.
    ///
    /// Sets:
    /// - `reason`: spawn error
    SpawnFailed,

    /// One line of child output, drained during a poll.
    ///
    /// Sets:
    /// - `pid`: process id
    /// - `stream`: stdout or stderr
    /// - `reason`: the line (without newline)
    ChildOutput,

    /// Graceful termination was requested.
    ///
    /// Sets:
    /// - `pid`: process id
    /// - `grace_ms`: configured grace period
    StopRequested,

    /// The child ignored the termination request; it is being killed.
    ///
    /// Sets:
    /// - `pid`: process id
    /// - `grace_ms`: configured grace period
    GraceExceeded,

    /// The child is gone after a stop (graceful or forced).
    ///
    /// Sets:
    /// - `pid`: process id
    /// - `code`: exit code, if it exited normally
    /// - `reason`: `"terminated"` or `"killed"`
    ChildStopped,

    /// The child exited on its own.
    ///
    /// Sets:
    /// - `pid`: process id
    /// - `code`: exit code, if it exited normally
    ChildCrashed,

    // === Shutdown events ===
    /// Shutdown requested (OS signal observed).
    ShutdownRequested,

    /// The loop released the child and is about to return.
    ShutdownComplete,
}

/// Output stream a [`EventKind::ChildOutput`] line came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputStream {
    Stdout,
    Stderr,
}

impl OutputStream {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputStream::Stdout => "stdout",
            OutputStream::Stderr => "stderr",
        }
    }
}

/// Runtime event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Child process id, if applicable.
    pub pid: Option<u32>,
    /// Child exit code, if it exited normally.
    pub code: Option<i32>,
    /// Grace period in milliseconds (compact).
    pub grace_ms: Option<u32>,
    /// Output stream of a drained line.
    pub stream: Option<OutputStream>,
    /// Human-readable reason, error or output line.
    pub reason: Option<Arc<str>>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            pid: None,
            code: None,
            grace_ms: None,
            stream: None,
            reason: None,
        }
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches the child process id.
    #[inline]
    pub fn with_pid(mut self, pid: u32) -> Self {
        self.pid = Some(pid);
        self
    }

    /// Attaches the exit code (`None` when the child died from a signal).
    #[inline]
    pub fn with_code(mut self, code: Option<i32>) -> Self {
        self.code = code;
        self
    }

    /// Attaches the grace period (stored as milliseconds).
    #[inline]
    pub fn with_grace(mut self, d: Duration) -> Self {
        let ms = d.as_millis().min(u128::from(u32::MAX)) as u32;
        self.grace_ms = Some(ms);
        self
    }

    /// Attaches one output line and the stream it came from.
    #[inline]
    pub fn with_line(mut self, stream: OutputStream, line: impl Into<Arc<str>>) -> Self {
        self.stream = Some(stream);
        self.reason = Some(line.into());
        self
    }
}
