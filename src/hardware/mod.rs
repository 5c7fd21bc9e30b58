//! Hardware seams.
//!
//! The GPIO electrical layer lives outside this crate. The supervisor only
//! needs two primitives from it: [`Led`] outputs and a [`ButtonSource`] of
//! debounced presses. A board driver implements these traits; the in-crate
//! implementations cover tests, embedding and console operation.

mod button;
mod led;

pub use button::{ButtonSource, ButtonTrigger, ChannelButton, StdinButton};
pub use led::{Led, LogLed, MemoryLed};
