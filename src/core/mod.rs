//! Runtime core: the button-driven process supervisor.
//!
//! Internal modules:
//! - [`indicator`]: two-LED status state machine with startup self-test;
//! - [`process`]: the at-most-one timer child (start / stop / poll);
//! - [`input`]: button presses to toggle commands, with debounce;
//! - [`shutdown`]: OS termination signals to a shutdown command;
//! - [`supervisor`]: the loop owning all mutable state;
//! - [`builder`]: wiring of the loop and its handle;
//! - [`command`]: requests accepted by the loop.

mod builder;
mod command;
mod indicator;
mod input;
mod process;
mod shutdown;
mod supervisor;

pub use builder::{SupervisorBuilder, SupervisorHandle};
pub use command::Command;
pub use indicator::{IndicatorDriver, IndicatorState};
pub use input::InputWatcher;
pub use process::{HealthStatus, LaunchCommand, ProcessSupervisor, StopKind, StopOutcome};
pub use shutdown::ShutdownCoordinator;
pub use supervisor::{Status, Supervisor};
