//! Configuration records.
//!
//! All records are immutable once built. The validating constructors run once
//! at startup; a failure there is fatal and happens before any hardware is
//! touched.
//!
//! - [`HardwareConfig`]: button/LED pins and debounce interval;
//! - [`ServerConfig`]: how to launch the timer process;
//! - [`SupervisorConfig`]: timing knobs of the loop;
//! - [`Args`]: command-line surface of the binary.

mod cli;
mod hardware;
mod server;
mod supervisor;

pub use cli::Args;
pub use hardware::HardwareConfig;
pub use server::{ServerConfig, ServerParams};
pub use supervisor::SupervisorConfig;
