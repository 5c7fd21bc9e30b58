//! # ProcessSupervisor: the at-most-one timer child.
//!
//! Owns the single [`ChildHandle`] and implements its three operations:
//!
//! ```text
//! start(cfg) ──► stop() (if a child exists)
//!            ──► LaunchCommand::from_config(cfg) ──► spawn (stdout/stderr piped)
//!            ──► publish ChildStarted
//!
//! stop()     ──► no child? return None
//!            ──► SIGTERM ──► wait up to `grace`
//!                   ├─ exited         ──► Terminated
//!                   └─ still running  ──► publish GraceExceeded ──► SIGKILL ──► Killed
//!            ──► let readers reach EOF (bounded), drain leftover output
//!            ──► publish ChildStopped, clear handle
//!
//! poll()     ──► no child? Idle
//!            ──► try_wait():
//!                   ├─ running ──► drain output ──► Alive
//!                   └─ exited  ──► drain output, clear handle ──► Crashed
//! ```
//!
//! ## Rules
//! - At most one child exists at any instant; `start` fully stops the previous one first.
//! - `stop` is idempotent and always returns with the handle cleared.
//! - `stop` never blocks longer than `grace`, plus the time to reap a killed process,
//!   plus a short settle window for the last output lines.
//! - Output is diagnostic only: drained lines are published as `ChildOutput` events.

use std::fmt;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use futures::future::join_all;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time;
use tracing::{debug, warn};

use crate::config::ServerConfig;
use crate::error::SpawnError;
use crate::events::{Bus, Event, EventKind, OutputStream};

/// How long `stop` waits for the output readers after the child is gone.
///
/// Grandchildren holding the pipes open are cut off after this.
const OUTPUT_SETTLE: Duration = Duration::from_millis(200);

/// Argument vector of the timer process, built deterministically from [`ServerConfig`].
///
/// Layout (order matters to the timer):
/// ```text
/// [launcher..] <executable> -logdir <dir> -u <user> -p <password> -d <timer-type>
///     -lanes <n> -x [extra..] [-simulate-timer] <url>
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct LaunchCommand {
    argv: Vec<String>,
    password_index: usize,
}

impl LaunchCommand {
    pub fn from_config(cfg: &ServerConfig) -> Self {
        let mut argv: Vec<String> = cfg.launcher().to_vec();
        argv.push(cfg.executable().to_string_lossy().into_owned());
        argv.push("-logdir".into());
        argv.push(cfg.log_dir().to_string_lossy().into_owned());
        argv.push("-u".into());
        argv.push(cfg.username().into());
        argv.push("-p".into());
        let password_index = argv.len();
        argv.push(cfg.password().into());
        argv.push("-d".into());
        argv.push(cfg.timer_type().into());
        argv.push("-lanes".into());
        argv.push(cfg.lanes().to_string());
        argv.push("-x".into());
        argv.extend(cfg.extra_args().iter().cloned());
        if cfg.simulate() {
            argv.push("-simulate-timer".into());
        }
        argv.push(cfg.url().into());

        Self {
            argv,
            password_index,
        }
    }

    /// Program to execute (the launcher, or the executable itself).
    pub fn program(&self) -> &str {
        &self.argv[0]
    }

    /// Arguments after the program.
    pub fn args(&self) -> &[String] {
        &self.argv[1..]
    }

    /// Full argument vector, program first.
    pub fn argv(&self) -> &[String] {
        &self.argv
    }
}

/// Renders the command line with the password masked.
impl fmt::Display for LaunchCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, arg) in self.argv.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            if i == self.password_index {
                f.write_str("***")?;
            } else {
                f.write_str(arg)?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for LaunchCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("LaunchCommand").field(&self.to_string()).finish()
    }
}

/// Result of a liveness check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthStatus {
    /// No child is tracked.
    Idle,
    /// The tracked child is running.
    Alive { pid: u32 },
    /// The tracked child exited on its own; the handle is already released.
    Crashed {
        pid: u32,
        code: Option<i32>,
        signal: Option<i32>,
    },
}

/// How a stopped child went away.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopKind {
    /// Exited after the termination request, within the grace period.
    Terminated,
    /// Still alive after the grace period; force-killed.
    Killed,
}

impl StopKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StopKind::Terminated => "terminated",
            StopKind::Killed => "killed",
        }
    }
}

/// Summary of a completed stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StopOutcome {
    pub pid: u32,
    pub kind: StopKind,
    pub code: Option<i32>,
}

/// Live timer process: pid, piped output and reader tasks.
struct ChildHandle {
    pid: u32,
    child: Child,
    output: mpsc::UnboundedReceiver<(OutputStream, String)>,
    readers: Vec<JoinHandle<()>>,
}

impl ChildHandle {
    /// Waits until every reader has hit EOF, at most `limit`.
    async fn settle_output(&mut self, limit: Duration) {
        let readers = join_all(self.readers.iter_mut());
        if time::timeout(limit, readers).await.is_err() {
            debug!(pid = self.pid, "output pipes still open, dropping the rest");
        }
    }

    /// Stops the reader tasks. Grandchildren may keep the pipes open after the child is gone.
    fn release(self) {
        for reader in self.readers {
            reader.abort();
        }
    }
}

/// Owner of the at-most-one timer process.
pub struct ProcessSupervisor {
    child: Option<ChildHandle>,
    grace: Duration,
    bus: Bus,
}

impl ProcessSupervisor {
    pub fn new(grace: Duration, bus: Bus) -> Self {
        Self {
            child: None,
            grace,
            bus,
        }
    }

    /// Pid of the tracked child, if any.
    pub fn pid(&self) -> Option<u32> {
        self.child.as_ref().map(|c| c.pid)
    }

    pub fn is_running(&self) -> bool {
        self.child.is_some()
    }

    /// Launches the timer, stopping any tracked child first.
    ///
    /// On error no handle is retained.
    pub async fn start(&mut self, cfg: &ServerConfig) -> Result<u32, SpawnError> {
        self.stop().await;

        let cmd = LaunchCommand::from_config(cfg);
        self.bus
            .publish(Event::new(EventKind::ChildStarting).with_reason(cmd.to_string()));

        let mut child = Command::new(cmd.program())
            .args(cmd.args())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| SpawnError::Io {
                program: cmd.program().to_string(),
                source,
            })?;

        let Some(pid) = child.id() else {
            return Err(SpawnError::MissingPid);
        };

        let (tx, output) = mpsc::unbounded_channel();
        let mut readers = Vec::with_capacity(2);
        if let Some(stdout) = child.stdout.take() {
            readers.push(spawn_reader(stdout, OutputStream::Stdout, tx.clone()));
        }
        if let Some(stderr) = child.stderr.take() {
            readers.push(spawn_reader(stderr, OutputStream::Stderr, tx));
        }

        self.child = Some(ChildHandle {
            pid,
            child,
            output,
            readers,
        });
        self.bus.publish(Event::new(EventKind::ChildStarted).with_pid(pid));
        Ok(pid)
    }

    /// Stops the tracked child: termination request, bounded wait, kill on timeout.
    ///
    /// Returns `None` when there was nothing to stop.
    pub async fn stop(&mut self) -> Option<StopOutcome> {
        let mut handle = self.child.take()?;
        let pid = handle.pid;
        self.bus.publish(
            Event::new(EventKind::StopRequested)
                .with_pid(pid)
                .with_grace(self.grace),
        );

        request_termination(&mut handle.child, pid);

        let waited = time::timeout(self.grace, handle.child.wait()).await;
        let (kind, status) = match waited {
            Ok(Ok(status)) => (StopKind::Terminated, Some(status)),
            Ok(Err(e)) => {
                warn!(pid, error = %e, "waiting for timer failed, killing");
                (StopKind::Killed, force_kill(&mut handle.child, pid).await)
            }
            Err(_elapsed) => {
                self.bus.publish(
                    Event::new(EventKind::GraceExceeded)
                        .with_pid(pid)
                        .with_grace(self.grace),
                );
                (StopKind::Killed, force_kill(&mut handle.child, pid).await)
            }
        };

        handle.settle_output(OUTPUT_SETTLE).await;
        drain_output(&self.bus, &mut handle);
        handle.release();

        let code = status.and_then(|s| s.code());
        self.bus.publish(
            Event::new(EventKind::ChildStopped)
                .with_pid(pid)
                .with_code(code)
                .with_reason(kind.as_str()),
        );
        Some(StopOutcome { pid, kind, code })
    }

    /// Non-blocking liveness check; forwards any output gathered since the last poll.
    pub fn poll(&mut self) -> HealthStatus {
        let Some(handle) = self.child.as_mut() else {
            return HealthStatus::Idle;
        };
        let pid = handle.pid;

        match handle.child.try_wait() {
            Ok(None) => {
                drain_output(&self.bus, handle);
                debug!(pid, "timer is alive");
                HealthStatus::Alive { pid }
            }
            Ok(Some(status)) => {
                drain_output(&self.bus, handle);
                if let Some(handle) = self.child.take() {
                    handle.release();
                }
                HealthStatus::Crashed {
                    pid,
                    code: status.code(),
                    signal: exit_signal(&status),
                }
            }
            Err(e) => {
                warn!(pid, error = %e, "could not query timer status");
                HealthStatus::Alive { pid }
            }
        }
    }
}

/// Publishes every output line buffered so far.
fn drain_output(bus: &Bus, handle: &mut ChildHandle) {
    while let Ok((stream, line)) = handle.output.try_recv() {
        bus.publish(
            Event::new(EventKind::ChildOutput)
                .with_pid(handle.pid)
                .with_line(stream, line),
        );
    }
}

fn spawn_reader<R>(
    pipe: R,
    stream: OutputStream,
    tx: mpsc::UnboundedSender<(OutputStream, String)>,
) -> JoinHandle<()>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut lines = BufReader::new(pipe).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            if tx.send((stream, line)).is_err() {
                break;
            }
        }
    })
}

/// Sends the cooperative termination request.
#[cfg(unix)]
fn request_termination(_child: &mut Child, pid: u32) {
    use nix::sys::signal::{Signal, kill};
    use nix::unistd::Pid;

    let Ok(raw) = i32::try_from(pid) else {
        warn!(pid, "pid out of range, cannot signal");
        return;
    };
    if let Err(e) = kill(Pid::from_raw(raw), Signal::SIGTERM) {
        // ESRCH: already exited, the wait below reaps it.
        debug!(pid, error = %e, "SIGTERM not delivered");
    }
}

#[cfg(not(unix))]
fn request_termination(child: &mut Child, pid: u32) {
    if let Err(e) = child.start_kill() {
        debug!(pid, error = %e, "termination request not delivered");
    }
}

/// Kills the child and reaps it.
async fn force_kill(child: &mut Child, pid: u32) -> Option<ExitStatus> {
    if let Err(e) = child.kill().await {
        warn!(pid, error = %e, "kill failed");
    }
    child.try_wait().ok().flatten()
}

#[cfg(unix)]
fn exit_signal(status: &ExitStatus) -> Option<i32> {
    use std::os::unix::process::ExitStatusExt;
    status.signal()
}

#[cfg(not(unix))]
fn exit_signal(_status: &ExitStatus) -> Option<i32> {
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServerParams;

    fn config(executable: std::path::PathBuf, params: ServerParams) -> ServerConfig {
        ServerConfig::new(ServerParams {
            executable,
            ..params
        })
        .unwrap()
    }

    #[test]
    fn argument_vector_is_ordered() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let exe = file.path().to_path_buf();
        let cfg = config(
            exe.clone(),
            ServerParams {
                log_dir: "/var/log/timer".into(),
                username: "Timer".into(),
                password: "secret".into(),
                timer_type: "NewBold".into(),
                lanes: 4,
                simulate: true,
                url: "https://x/".into(),
                ..ServerParams::default()
            },
        );

        let cmd = LaunchCommand::from_config(&cfg);
        let expected: Vec<String> = [
            exe.to_str().unwrap(),
            "-logdir",
            "/var/log/timer",
            "-u",
            "Timer",
            "-p",
            "secret",
            "-d",
            "NewBold",
            "-lanes",
            "4",
            "-x",
            "-simulate-timer",
            "https://x/",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        assert_eq!(cmd.argv(), expected.as_slice());
        assert_eq!(cmd.program(), exe.to_str().unwrap());
    }

    #[test]
    fn launcher_and_extra_args_keep_url_last() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let exe = file.path().to_path_buf();
        let cfg = config(
            exe.clone(),
            ServerParams {
                launcher: Some("java -jar".into()),
                url: "https://x/".into(),
                extra_args: vec!["-v".into()],
                simulate: false,
                ..ServerParams::default()
            },
        );

        let cmd = LaunchCommand::from_config(&cfg);
        assert_eq!(cmd.program(), "java");
        assert_eq!(cmd.args()[0], "-jar");
        assert_eq!(cmd.args()[1], exe.to_str().unwrap());
        let tail: Vec<&str> = cmd.argv().iter().rev().take(3).map(String::as_str).collect();
        assert_eq!(tail, ["https://x/", "-v", "-x"]);
        assert!(!cmd.argv().iter().any(|a| a == "-simulate-timer"));
    }

    #[test]
    fn display_masks_password() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let cfg = config(
            file.path().to_path_buf(),
            ServerParams {
                password: "hunter2".into(),
                url: "https://x/".into(),
                ..ServerParams::default()
            },
        );
        let shown = LaunchCommand::from_config(&cfg).to_string();
        assert!(!shown.contains("hunter2"));
        assert!(shown.contains("-p *** -d"));
    }

    #[tokio::test]
    async fn idle_supervisor_has_nothing_to_do() {
        let mut sup = ProcessSupervisor::new(Duration::from_secs(5), Bus::new(8));
        assert_eq!(sup.poll(), HealthStatus::Idle);
        assert_eq!(sup.stop().await, None);
        assert_eq!(sup.stop().await, None);
        assert!(!sup.is_running());
    }

    #[tokio::test]
    async fn spawn_failure_keeps_no_handle() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let cfg = config(
            file.path().to_path_buf(),
            ServerParams {
                launcher: Some("/no/such/interpreter".into()),
                url: "https://x/".into(),
                ..ServerParams::default()
            },
        );
        let mut sup = ProcessSupervisor::new(Duration::from_secs(5), Bus::new(8));
        let err = sup.start(&cfg).await.unwrap_err();
        assert!(matches!(err, SpawnError::Io { .. }));
        assert!(!sup.is_running());
        assert_eq!(sup.poll(), HealthStatus::Idle);
    }
}
