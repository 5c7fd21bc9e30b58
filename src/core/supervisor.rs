//! # Supervisor: the single owner of the timer process and the status LEDs.
//!
//! The [`Supervisor`] is an actor. It exclusively owns the [`ProcessSupervisor`]
//! and the [`IndicatorDriver`]; every other context (button watcher, signal
//! coordinator, embedding code) only sends [`Command`]s through its queue.
//! Health polls come from a ticker inside the same `select!`, so all mutations
//! happen one at a time.
//!
//! ## High-level architecture
//! ```text
//! InputWatcher ──Toggle───┐
//! ShutdownCoordinator ──Shutdown──┤
//! SupervisorHandle ──Toggle/Shutdown──┤
//!                                 ▼
//!                        [command queue]            ticker (poll_interval)
//!                                 │                        │
//!                                 └──────► select! ◄───────┘
//!                                            │
//!               ┌────────────────────────────┼─────────────────────────┐
//!               ▼                            ▼                         ▼
//!     Toggle: start / stop        Tick: poll() → Crashed?      Shutdown: stop,
//!       → indicator Running/        → stop + indicator           cancel token,
//!         Stopped                     Stopped                    return Ok
//!
//! Every step publishes Events on the Bus and the current Status on a watch channel.
//! ```
//!
//! ## Lifecycle
//! 1. subscriber listener started (Bus → SubscriberSet)
//! 2. indicator self-test (blocking; commands wait in the queue)
//! 3. command/tick loop
//! 4. on `Shutdown`: stop protocol, indicator `Stopped`, runtime token cancelled, listener flushed

use std::sync::Arc;

use tokio::sync::{broadcast, mpsc, watch};
use tokio::time::{self, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use super::builder::SupervisorBuilder;
use super::command::Command;
use super::indicator::{IndicatorDriver, IndicatorState};
use super::process::{HealthStatus, ProcessSupervisor};
use crate::config::{HardwareConfig, ServerConfig, SupervisorConfig};
use crate::error::RuntimeError;
use crate::events::{Bus, Event, EventKind};
use crate::subscribers::{Subscribe, SubscriberSet};

/// Observable state of the supervisor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Status {
    /// Current LED state.
    pub indicator: IndicatorState,
    /// Pid of the tracked timer process, if any.
    pub pid: Option<u32>,
}

/// Supervisor loop. Build with [`Supervisor::builder`], drive with [`Supervisor::run`].
pub struct Supervisor {
    pub(super) cfg: SupervisorConfig,
    pub(super) server: ServerConfig,
    pub(super) process: ProcessSupervisor,
    pub(super) indicator: IndicatorDriver,
    pub(super) bus: Bus,
    pub(super) subscribers: Vec<Arc<dyn Subscribe>>,
    pub(super) commands: mpsc::Receiver<Command>,
    pub(super) status: watch::Sender<Status>,
    pub(super) token: CancellationToken,
}

impl Supervisor {
    /// Starts building a supervisor for the given wiring and launch configuration.
    pub fn builder(hardware: HardwareConfig, server: ServerConfig) -> SupervisorBuilder {
        SupervisorBuilder::new(hardware, server)
    }

    /// Runs the self-test, then serves commands and health ticks until shutdown.
    ///
    /// Returns `Ok(())` after a [`Command::Shutdown`]. If every command sender is
    /// dropped first, the timer is still stopped and [`RuntimeError::ChannelClosed`]
    /// is returned.
    pub async fn run(mut self) -> Result<(), RuntimeError> {
        let listener = self.subscriber_listener();

        self.indicator
            .initialize(self.cfg.blink_count, self.cfg.blink_interval)
            .await;
        self.bus.publish(Event::new(EventKind::IndicatorSelfTest));
        self.publish_status();
        info!("timer ui initialized");

        let mut ticker = time::interval(self.cfg.poll_interval_clamped());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let result = loop {
            tokio::select! {
                biased;
                cmd = self.commands.recv() => match cmd {
                    Some(Command::Toggle) => self.toggle().await,
                    Some(Command::Shutdown) => break Ok(()),
                    None => {
                        warn!("all command senders dropped");
                        break Err(RuntimeError::ChannelClosed);
                    }
                },
                _ = ticker.tick() => self.on_tick().await,
            }
        };

        self.shutdown().await;
        let _ = listener.await;
        result
    }

    /// Subscribes to the bus and forwards events to the subscriber set until shutdown completes.
    fn subscriber_listener(&self) -> tokio::task::JoinHandle<()> {
        let mut rx = self.bus.subscribe();
        let set = SubscriberSet::new(self.subscribers.clone());
        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(ev) => {
                        set.emit(&ev);
                        if ev.kind == EventKind::ShutdownComplete {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        warn!(skipped = n, "subscriber listener lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
            set.shutdown().await;
        })
    }

    async fn toggle(&mut self) {
        self.bus.publish(Event::new(EventKind::ToggleRequested));
        if self.process.is_running() {
            self.stop_timer().await;
        } else {
            self.start_timer().await;
        }
    }

    async fn start_timer(&mut self) {
        match self.process.start(&self.server).await {
            Ok(_pid) => self.indicator.set_running(),
            Err(e) => {
                error!(error = %e, label = e.as_label(), "failed to start timer");
                self.bus
                    .publish(Event::new(EventKind::SpawnFailed).with_reason(e.to_string()));
                self.indicator.set_stopped();
            }
        }
        self.publish_status();
    }

    async fn stop_timer(&mut self) {
        self.process.stop().await;
        self.indicator.set_stopped();
        self.publish_status();
    }

    async fn on_tick(&mut self) {
        if let HealthStatus::Crashed { pid, code, signal } = self.process.poll() {
            warn!(pid, ?code, ?signal, "timer terminated on its own");
            self.bus.publish(
                Event::new(EventKind::ChildCrashed)
                    .with_pid(pid)
                    .with_code(code),
            );
            self.stop_timer().await;
        }
    }

    async fn shutdown(&mut self) {
        self.bus.publish(Event::new(EventKind::ShutdownRequested));
        self.stop_timer().await;
        self.token.cancel();
        self.bus.publish(Event::new(EventKind::ShutdownComplete));
    }

    fn publish_status(&self) {
        self.status.send_replace(Status {
            indicator: self.indicator.state(),
            pid: self.process.pid(),
        });
    }
}
