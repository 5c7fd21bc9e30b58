//! # timervisor
//!
//! **Timervisor** lets a physical push-button and two status LEDs control an
//! external, long-running race timer process on a single-board computer.
//!
//! Pressing the button toggles the timer between running and stopped; the
//! LEDs show the current state; the timer is health-polled, stopped with a
//! graceful termination request and force-killed when it does not comply; and
//! the whole unit shuts down cleanly on `SIGINT` / `SIGTERM`.
//!
//! ## Architecture
//! ```text
//!   ┌───────────────┐   ┌─────────────────────┐   ┌──────────────────┐
//!   │ ButtonSource  │   │ OS signals          │   │ SupervisorHandle │
//!   │ (GPIO driver) │   │ SIGINT / SIGTERM    │   │ (embedders/tests)│
//!   └──────┬────────┘   └─────────┬───────────┘   └────────┬─────────┘
//!          ▼                      ▼                        │
//!   ┌───────────────┐   ┌─────────────────────┐            │
//!   │ InputWatcher  │   │ ShutdownCoordinator │            │
//!   │ (debounce)    │   │                     │            │
//!   └──────┬────────┘   └─────────┬───────────┘            │
//!          │ Toggle               │ Shutdown               │ Toggle/Shutdown
//!          └──────────────────────┼────────────────────────┘
//!                                 ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Supervisor (single owner of all mutable state)                   │
//! │  - command queue + poll ticker in one select!                     │
//! │  - ProcessSupervisor (at most one timer child)                    │
//! │  - IndicatorDriver (Initializing → Stopped ⇄ Running)             │
//! └──────┬──────────────────────────────────────────────┬─────────────┘
//!        ▼                                              ▼
//!   Bus (broadcast Events) ──► SubscriberSet ──► LogWriter / custom
//!                                         watch::Receiver<Status>
//! ```
//!
//! ### Lifecycle
//! ```text
//! configs validated (fatal on error) ──► Supervisor::builder(..).build()
//!
//! run():
//!   ├─► LED self-test (3 blinks, 250ms), indicator Stopped
//!   └─► loop {
//!         Toggle   ─► no child? start : stop         ─► indicator Running/Stopped
//!         Tick     ─► poll(): Crashed?  ─► stop      ─► indicator Stopped
//!         Shutdown ─► stop, cancel token, return Ok
//!       }
//!
//! stop(): SIGTERM ─► wait ≤ grace (5s) ─► exited? done : SIGKILL
//! ```
//!
//! ## Features
//! | Area              | Description                                              | Key types / traits                           |
//! |-------------------|----------------------------------------------------------|----------------------------------------------|
//! | **Supervision**   | Toggle, poll and stop the timer process.                 | [`Supervisor`], [`ProcessSupervisor`]        |
//! | **Indicators**    | Two-LED state machine with startup self-test.            | [`IndicatorDriver`], [`Led`]                 |
//! | **Input**         | Debounced button presses to toggle commands.             | [`InputWatcher`], [`ButtonSource`]           |
//! | **Shutdown**      | Signal-driven, serialized shutdown.                      | [`ShutdownCoordinator`]                      |
//! | **Subscriber API**| Hook into lifecycle events.                              | [`Subscribe`], [`LogWriter`]                 |
//! | **Configuration** | Validated, immutable configuration records.              | [`ServerConfig`], [`HardwareConfig`]         |
//! | **Errors**        | Typed errors for configuration, spawn and runtime.       | [`ConfigError`], [`SpawnError`], [`RuntimeError`] |
//!
//! ## Example
//! ```no_run
//! use timervisor::{
//!     ChannelButton, HardwareConfig, InputWatcher, MemoryLed, ServerConfig, ServerParams,
//!     ShutdownCoordinator, Supervisor,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let hardware = HardwareConfig::default();
//!     let server = ServerConfig::new(ServerParams {
//!         executable: "/home/pi/timer/run_timer.sh".into(),
//!         url: "https://derby.local/".into(),
//!         ..ServerParams::default()
//!     })?;
//!
//!     let (sup, handle) = Supervisor::builder(hardware.clone(), server)
//!         .with_leds(MemoryLed::new(), MemoryLed::new())
//!         .build();
//!
//!     // A GPIO driver calls `trigger.press()` from its edge callback.
//!     let (button, _trigger) = ChannelButton::new(16);
//!     InputWatcher::new(button, hardware.debounce()).spawn(handle.commands(), handle.token());
//!     ShutdownCoordinator::install()?.spawn(handle.commands(), handle.token());
//!
//!     sup.run().await?;
//!     Ok(())
//! }
//! ```
mod config;
mod core;
mod error;
mod events;
mod hardware;
mod subscribers;

// ---- Public re-exports ----

pub use config::{Args, HardwareConfig, ServerConfig, ServerParams, SupervisorConfig};
pub use core::{
    Command, HealthStatus, IndicatorDriver, IndicatorState, InputWatcher, LaunchCommand,
    ProcessSupervisor, ShutdownCoordinator, Status, StopKind, StopOutcome, Supervisor,
    SupervisorBuilder, SupervisorHandle,
};
pub use error::{ConfigError, RuntimeError, SpawnError};
pub use events::{Bus, Event, EventKind, OutputStream};
pub use hardware::{ButtonSource, ButtonTrigger, ChannelButton, Led, LogLed, MemoryLed, StdinButton};
pub use subscribers::{LogWriter, Subscribe, SubscriberSet};
