//! Requests accepted by the supervisor loop.
//!
//! Every event source (button, signal, embedding code) talks to the loop only
//! through these commands; the loop applies them one at a time.

/// A request for the supervisor loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Start the timer if none is tracked, stop it otherwise.
    Toggle,
    /// Stop the timer, settle the indicator and end the loop.
    Shutdown,
}
