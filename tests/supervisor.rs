use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use nix::sys::signal::{Signal, kill};
use nix::unistd::Pid;
use tempfile::TempDir;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::{Instant, timeout};

use timervisor::{
    Bus, ChannelButton, Event, EventKind, HardwareConfig, HealthStatus, IndicatorState,
    InputWatcher, Led, LogWriter, MemoryLed, ProcessSupervisor, RuntimeError, ServerConfig,
    ServerParams, StopKind, Subscribe, Supervisor, SupervisorConfig, SupervisorHandle,
};

const WAIT: Duration = Duration::from_secs(5);

/// Writes `body` as a shell script; the timer is launched as `/bin/sh <script> <args..>`.
fn timer_script(dir: &TempDir, name: &str, body: &str) -> ServerConfig {
    let path: PathBuf = dir.path().join(name);
    std::fs::write(&path, body).unwrap();
    ServerConfig::new(ServerParams {
        executable: path,
        launcher: Some("/bin/sh".into()),
        url: "https://x/".into(),
        lanes: 4,
        timer_type: "NewBold".into(),
        simulate: true,
        ..ServerParams::default()
    })
    .unwrap()
}

fn fast_config() -> SupervisorConfig {
    SupervisorConfig {
        grace: Duration::from_millis(500),
        poll_interval: Duration::from_millis(100),
        blink_count: 3,
        blink_interval: Duration::from_millis(10),
        ..SupervisorConfig::default()
    }
}

fn is_alive(pid: u32) -> bool {
    kill(Pid::from_raw(pid as i32), None).is_ok()
}

struct Rig {
    handle: SupervisorHandle,
    running: MemoryLed,
    stopped: MemoryLed,
    events: broadcast::Receiver<Event>,
    task: JoinHandle<Result<(), RuntimeError>>,
}

async fn rig(server: ServerConfig, cfg: SupervisorConfig) -> Rig {
    let running = MemoryLed::new();
    let stopped = MemoryLed::new();
    let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter::new())];
    let (sup, handle) = Supervisor::builder(HardwareConfig::default(), server)
        .with_config(cfg)
        .with_leds(running.clone(), stopped.clone())
        .with_subscribers(subs)
        .build();
    let events = handle.subscribe();
    let task = tokio::spawn(sup.run());

    timeout(WAIT, handle.wait_for(|s| s.indicator == IndicatorState::Stopped))
        .await
        .expect("self-test did not finish")
        .unwrap();
    Rig {
        handle,
        running,
        stopped,
        events,
        task,
    }
}

async fn next_event(events: &mut broadcast::Receiver<Event>, kind: EventKind) -> Event {
    timeout(WAIT, async {
        loop {
            let ev = events.recv().await.unwrap();
            if ev.kind == kind {
                return ev;
            }
        }
    })
    .await
    .unwrap_or_else(|_| panic!("no {kind:?} event"))
}

#[tokio::test]
async fn press_starts_and_second_press_stops_gracefully() {
    let dir = tempfile::tempdir().unwrap();
    let server = timer_script(&dir, "timer.sh", "exec sleep 30\n");
    let mut rig = rig(server, fast_config()).await;
    assert!(rig.stopped.is_on() && !rig.running.is_on());

    rig.handle.toggle().await.unwrap();
    let status = timeout(WAIT, rig.handle.wait_for(|s| s.pid.is_some()))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(status.indicator, IndicatorState::Running);
    assert!(rig.running.is_on() && !rig.stopped.is_on());
    let pid = status.pid.unwrap();
    assert!(is_alive(pid));

    let starting = next_event(&mut rig.events, EventKind::ChildStarting).await;
    let cmd = starting.reason.unwrap();
    assert!(cmd.ends_with("-lanes 4 -x -simulate-timer https://x/"), "{cmd}");

    rig.handle.toggle().await.unwrap();
    let status = timeout(WAIT, rig.handle.wait_for(|s| s.pid.is_none()))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(status.indicator, IndicatorState::Stopped);
    assert!(!rig.running.is_on() && rig.stopped.is_on());
    assert!(!is_alive(pid));

    let stopped = next_event(&mut rig.events, EventKind::ChildStopped).await;
    assert_eq!(stopped.pid, Some(pid));
    assert_eq!(stopped.reason.as_deref(), Some("terminated"));

    rig.handle.shutdown().await.unwrap();
    rig.task.await.unwrap().unwrap();
}

#[tokio::test]
async fn crashed_child_converges_within_one_poll() {
    let dir = tempfile::tempdir().unwrap();
    let server = timer_script(&dir, "crash.sh", "echo ready\nsleep 0.3\nexit 3\n");
    let mut rig = rig(server, fast_config()).await;

    rig.handle.toggle().await.unwrap();
    let pid = timeout(WAIT, rig.handle.wait_for(|s| s.pid.is_some()))
        .await
        .unwrap()
        .unwrap()
        .pid
        .unwrap();

    let crashed = next_event(&mut rig.events, EventKind::ChildCrashed).await;
    assert_eq!(crashed.pid, Some(pid));
    assert_eq!(crashed.code, Some(3));

    let status = timeout(WAIT, rig.handle.wait_for(|s| s.pid.is_none()))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(status.indicator, IndicatorState::Stopped);
    assert!(rig.stopped.is_on());

    // Next press starts a fresh timer.
    rig.handle.toggle().await.unwrap();
    let status = timeout(WAIT, rig.handle.wait_for(|s| s.pid.is_some()))
        .await
        .unwrap()
        .unwrap();
    assert_ne!(status.pid, Some(pid));

    rig.handle.shutdown().await.unwrap();
    rig.task.await.unwrap().unwrap();
}

#[tokio::test]
async fn externally_killed_child_is_detected() {
    let dir = tempfile::tempdir().unwrap();
    let server = timer_script(&dir, "timer.sh", "exec sleep 30\n");
    let mut rig = rig(server, fast_config()).await;

    rig.handle.toggle().await.unwrap();
    let pid = timeout(WAIT, rig.handle.wait_for(|s| s.pid.is_some()))
        .await
        .unwrap()
        .unwrap()
        .pid
        .unwrap();

    kill(Pid::from_raw(pid as i32), Signal::SIGKILL).unwrap();
    let killed_at = Instant::now();

    let status = timeout(WAIT, rig.handle.wait_for(|s| s.pid.is_none()))
        .await
        .unwrap()
        .unwrap();
    assert!(killed_at.elapsed() < Duration::from_secs(1));
    assert_eq!(status.indicator, IndicatorState::Stopped);
    let crashed = next_event(&mut rig.events, EventKind::ChildCrashed).await;
    assert_eq!(crashed.code, None);

    rig.handle.shutdown().await.unwrap();
    rig.task.await.unwrap().unwrap();
}

#[tokio::test]
async fn stubborn_child_is_killed_after_grace() {
    let dir = tempfile::tempdir().unwrap();
    let server = timer_script(
        &dir,
        "stubborn.sh",
        "trap '' TERM\nwhile :; do sleep 0.1; done\n",
    );
    let grace = Duration::from_millis(400);
    let mut sup = ProcessSupervisor::new(grace, Bus::new(64));
    let pid = sup.start(&server).await.unwrap();
    // Let the shell install its trap.
    tokio::time::sleep(Duration::from_millis(200)).await;

    let started = Instant::now();
    let outcome = sup.stop().await.unwrap();
    let took = started.elapsed();

    assert_eq!(outcome.pid, pid);
    assert_eq!(outcome.kind, StopKind::Killed);
    assert!(took >= grace, "stopped too early: {took:?}");
    assert!(took < grace + Duration::from_secs(1), "stop took {took:?}");
    assert!(!is_alive(pid));
    assert!(!sup.is_running());
}

#[tokio::test]
async fn last_words_on_termination_are_forwarded() {
    let dir = tempfile::tempdir().unwrap();
    let server = timer_script(
        &dir,
        "polite.sh",
        "trap 'echo bye; exit 0' TERM\nwhile :; do sleep 0.05; done\n",
    );
    let bus = Bus::new(256);
    let mut events = bus.subscribe();
    let mut sup = ProcessSupervisor::new(Duration::from_secs(5), bus);

    for _ in 0..5 {
        let pid = sup.start(&server).await.unwrap();
        // Let the shell install its trap.
        tokio::time::sleep(Duration::from_millis(100)).await;

        let outcome = sup.stop().await.unwrap();
        assert_eq!(outcome.kind, StopKind::Terminated);
        assert_eq!(outcome.code, Some(0));

        let mut said_bye = false;
        loop {
            let ev = events.try_recv().unwrap();
            match ev.kind {
                EventKind::ChildOutput if ev.pid == Some(pid) => {
                    said_bye |= ev.reason.as_deref() == Some("bye");
                }
                EventKind::ChildStopped => break,
                _ => {}
            }
        }
        assert!(said_bye, "final line of {pid} lost");
    }
}

#[tokio::test]
async fn grace_exceeded_is_published_through_the_loop() {
    let dir = tempfile::tempdir().unwrap();
    let server = timer_script(
        &dir,
        "stubborn.sh",
        "trap '' TERM\nwhile :; do sleep 0.1; done\n",
    );
    let mut rig = rig(server, fast_config()).await;

    rig.handle.toggle().await.unwrap();
    let pid = timeout(WAIT, rig.handle.wait_for(|s| s.pid.is_some()))
        .await
        .unwrap()
        .unwrap()
        .pid
        .unwrap();
    tokio::time::sleep(Duration::from_millis(200)).await;

    rig.handle.toggle().await.unwrap();
    let ev = next_event(&mut rig.events, EventKind::GraceExceeded).await;
    assert_eq!(ev.pid, Some(pid));
    assert_eq!(ev.grace_ms, Some(500));

    let stopped = next_event(&mut rig.events, EventKind::ChildStopped).await;
    assert_eq!(stopped.reason.as_deref(), Some("killed"));
    assert!(!is_alive(pid));
    let status = timeout(WAIT, rig.handle.wait_for(|s| s.pid.is_none()))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(status.indicator, IndicatorState::Stopped);

    rig.handle.shutdown().await.unwrap();
    rig.task.await.unwrap().unwrap();
}

#[tokio::test]
async fn restart_fully_stops_previous_child() {
    let dir = tempfile::tempdir().unwrap();
    let server = timer_script(&dir, "timer.sh", "exec sleep 30\n");
    let mut sup = ProcessSupervisor::new(Duration::from_secs(5), Bus::new(64));

    let first = sup.start(&server).await.unwrap();
    let second = sup.start(&server).await.unwrap();

    assert_ne!(first, second);
    assert!(!is_alive(first));
    assert!(is_alive(second));
    assert_eq!(sup.pid(), Some(second));

    let outcome = sup.stop().await.unwrap();
    assert_eq!(outcome.kind, StopKind::Terminated);
    assert_eq!(sup.stop().await, None);
}

#[tokio::test]
async fn poll_forwards_child_output() {
    let dir = tempfile::tempdir().unwrap();
    let server = timer_script(
        &dir,
        "chatty.sh",
        "echo hello\necho oops >&2\nexec sleep 30\n",
    );
    let bus = Bus::new(64);
    let mut events = bus.subscribe();
    let mut sup = ProcessSupervisor::new(Duration::from_secs(5), bus);
    let pid = sup.start(&server).await.unwrap();

    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(sup.poll(), HealthStatus::Alive { pid });

    let mut lines = Vec::new();
    while let Ok(ev) = events.try_recv() {
        if ev.kind == EventKind::ChildOutput {
            lines.push((ev.stream.unwrap(), ev.reason.unwrap().to_string()));
        }
    }
    assert!(lines.contains(&(timervisor::OutputStream::Stdout, "hello".to_string())));
    assert!(lines.contains(&(timervisor::OutputStream::Stderr, "oops".to_string())));

    sup.stop().await;
}

#[tokio::test]
async fn spawn_failure_is_recoverable() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("timer.sh");
    std::fs::write(&path, "exec sleep 30\n").unwrap();
    let server = ServerConfig::new(ServerParams {
        executable: path,
        launcher: Some("/no/such/interpreter".into()),
        url: "https://x/".into(),
        ..ServerParams::default()
    })
    .unwrap();
    let mut rig = rig(server, fast_config()).await;

    rig.handle.toggle().await.unwrap();
    let ev = next_event(&mut rig.events, EventKind::SpawnFailed).await;
    assert!(ev.reason.is_some());
    assert_eq!(rig.handle.status().indicator, IndicatorState::Stopped);
    assert_eq!(rig.handle.status().pid, None);

    // The loop keeps serving presses.
    rig.handle.toggle().await.unwrap();
    next_event(&mut rig.events, EventKind::SpawnFailed).await;

    rig.handle.shutdown().await.unwrap();
    rig.task.await.unwrap().unwrap();
}

#[tokio::test]
async fn child_exists_iff_toggle_count_is_odd() {
    let dir = tempfile::tempdir().unwrap();
    let server = timer_script(&dir, "timer.sh", "exec sleep 30\n");
    let rig = rig(server, fast_config()).await;

    for n in 1..=5u32 {
        let odd = n % 2 == 1;
        rig.handle.toggle().await.unwrap();
        let status = timeout(WAIT, rig.handle.wait_for(|s| s.pid.is_some() == odd))
            .await
            .unwrap()
            .unwrap();
        let expected = if odd {
            IndicatorState::Running
        } else {
            IndicatorState::Stopped
        };
        assert_eq!(status.indicator, expected);
    }

    rig.handle.shutdown().await.unwrap();
    rig.task.await.unwrap().unwrap();
}

#[tokio::test]
async fn shutdown_stops_running_child() {
    let dir = tempfile::tempdir().unwrap();
    let server = timer_script(&dir, "timer.sh", "exec sleep 30\n");
    let rig = rig(server, fast_config()).await;
    let token = rig.handle.token();

    rig.handle.toggle().await.unwrap();
    let pid = timeout(WAIT, rig.handle.wait_for(|s| s.pid.is_some()))
        .await
        .unwrap()
        .unwrap()
        .pid
        .unwrap();

    rig.handle.shutdown().await.unwrap();
    rig.task.await.unwrap().unwrap();

    assert!(!is_alive(pid));
    assert!(token.is_cancelled());
    assert!(rig.stopped.is_on() && !rig.running.is_on());
    assert_eq!(rig.handle.status().indicator, IndicatorState::Stopped);
}

#[tokio::test]
async fn button_presses_drive_the_loop() {
    let dir = tempfile::tempdir().unwrap();
    let server = timer_script(&dir, "timer.sh", "exec sleep 30\n");
    let rig = rig(server, fast_config()).await;

    let (button, trigger) = ChannelButton::new(8);
    let watcher = InputWatcher::new(button, Duration::from_millis(100))
        .spawn(rig.handle.commands(), rig.handle.token());

    // A bouncing contact: only the first edge counts.
    let t0 = Instant::now();
    trigger.press_at(t0);
    trigger.press_at(t0 + Duration::from_millis(5));
    trigger.press_at(t0 + Duration::from_millis(20));

    let pid = timeout(WAIT, rig.handle.wait_for(|s| s.pid.is_some()))
        .await
        .unwrap()
        .unwrap()
        .pid
        .unwrap();
    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(rig.handle.status().pid, Some(pid));

    trigger.press();
    timeout(WAIT, rig.handle.wait_for(|s| s.pid.is_none()))
        .await
        .unwrap()
        .unwrap();

    rig.handle.shutdown().await.unwrap();
    rig.task.await.unwrap().unwrap();
    watcher.await.unwrap();
}

#[test]
fn nonexistent_executable_fails_before_anything_runs() {
    let err = ServerConfig::new(ServerParams {
        executable: "/no/such/timer.sh".into(),
        url: "https://x/".into(),
        ..ServerParams::default()
    })
    .unwrap_err();
    assert_eq!(err.as_label(), "config_executable_not_found");
}
