use std::sync::Arc;

use tokio::sync::{broadcast, mpsc, watch};
use tokio_util::sync::CancellationToken;

use super::command::Command;
use super::indicator::{IndicatorDriver, IndicatorState};
use super::process::ProcessSupervisor;
use super::supervisor::{Status, Supervisor};
use crate::config::{HardwareConfig, ServerConfig, SupervisorConfig};
use crate::error::RuntimeError;
use crate::events::{Bus, Event};
use crate::hardware::{Led, LogLed};
use crate::subscribers::Subscribe;

/// Builder for constructing a [`Supervisor`] and its [`SupervisorHandle`].
pub struct SupervisorBuilder {
    hardware: HardwareConfig,
    server: ServerConfig,
    cfg: SupervisorConfig,
    leds: Option<(Box<dyn Led>, Box<dyn Led>)>,
    subscribers: Vec<Arc<dyn Subscribe>>,
}

impl SupervisorBuilder {
    pub fn new(hardware: HardwareConfig, server: ServerConfig) -> Self {
        Self {
            hardware,
            server,
            cfg: SupervisorConfig::default(),
            leds: None,
            subscribers: Vec::new(),
        }
    }

    /// Overrides the timing configuration.
    pub fn with_config(mut self, cfg: SupervisorConfig) -> Self {
        self.cfg = cfg;
        self
    }

    /// Sets the LED outputs provided by the GPIO driver.
    ///
    /// Without this, virtual [`LogLed`]s named after the configured pins are used.
    pub fn with_leds(mut self, running: impl Led, stopped: impl Led) -> Self {
        self.leds = Some((Box::new(running), Box::new(stopped)));
        self
    }

    /// Sets event subscribers for observability.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Builds the supervisor and a handle to talk to it.
    ///
    /// Nothing runs until [`Supervisor::run`] is awaited.
    pub fn build(self) -> (Supervisor, SupervisorHandle) {
        let bus = Bus::new(self.cfg.bus_capacity_clamped());
        let (tx, rx) = mpsc::channel(self.cfg.command_capacity_clamped());
        let (status_tx, status_rx) = watch::channel(Status {
            indicator: IndicatorState::Initializing,
            pid: None,
        });
        let token = CancellationToken::new();

        let (running, stopped): (Box<dyn Led>, Box<dyn Led>) = match self.leds {
            Some(leds) => leds,
            None => (
                Box::new(LogLed::new("running", self.hardware.led_running_pin())),
                Box::new(LogLed::new("stopped", self.hardware.led_stopped_pin())),
            ),
        };

        let sup = Supervisor {
            process: ProcessSupervisor::new(self.cfg.grace, bus.clone()),
            indicator: IndicatorDriver::new(running, stopped),
            cfg: self.cfg,
            server: self.server,
            bus: bus.clone(),
            subscribers: self.subscribers,
            commands: rx,
            status: status_tx,
            token: token.clone(),
        };
        let handle = SupervisorHandle {
            commands: tx,
            status: status_rx,
            bus,
            token,
        };
        (sup, handle)
    }
}

/// Cloneable handle to a running [`Supervisor`].
#[derive(Clone)]
pub struct SupervisorHandle {
    commands: mpsc::Sender<Command>,
    status: watch::Receiver<Status>,
    bus: Bus,
    token: CancellationToken,
}

impl SupervisorHandle {
    /// Requests a start/stop toggle. Waits if the loop is busy.
    pub async fn toggle(&self) -> Result<(), RuntimeError> {
        self.send(Command::Toggle).await
    }

    /// Requests shutdown.
    pub async fn shutdown(&self) -> Result<(), RuntimeError> {
        self.send(Command::Shutdown).await
    }

    async fn send(&self, cmd: Command) -> Result<(), RuntimeError> {
        self.commands
            .send(cmd)
            .await
            .map_err(|_| RuntimeError::ChannelClosed)
    }

    /// Sender for wiring additional event sources (button watcher, signal coordinator).
    pub fn commands(&self) -> mpsc::Sender<Command> {
        self.commands.clone()
    }

    /// Latest published status.
    pub fn status(&self) -> Status {
        *self.status.borrow()
    }

    /// Waits until the status satisfies `pred` and returns it.
    pub async fn wait_for(&self, pred: impl FnMut(&Status) -> bool) -> Result<Status, RuntimeError> {
        let mut rx = self.status.clone();
        let status = rx
            .wait_for(pred)
            .await
            .map_err(|_| RuntimeError::ChannelClosed)?;
        Ok(*status)
    }

    /// Receiver of all events published after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.bus.subscribe()
    }

    /// Token cancelled when the supervisor shuts down.
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }
}
