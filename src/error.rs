//! Error types used by the timervisor runtime.
//!
//! This module defines three error enums:
//!
//! - [`ConfigError`]: invalid startup configuration (fatal, raised before the loop starts).
//! - [`SpawnError`]: the timer process could not be launched (recoverable).
//! - [`RuntimeError`]: failures of the supervisor loop itself.
//!
//! Each type provides `as_label` for logs and event reasons.

use std::path::PathBuf;

use thiserror::Error;

/// # Errors produced while validating configuration.
///
/// These are raised by the explicit constructors of
/// [`ServerConfig`](crate::ServerConfig) and [`HardwareConfig`](crate::HardwareConfig).
/// A configuration error is fatal: the unit must not initialize hardware or
/// enter the loop.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The timer executable does not exist or is not a regular file.
    #[error("executable {path:?} is not a file")]
    ExecutableNotFound {
        /// Path that was checked.
        path: PathBuf,
    },

    /// A field carries a value the supervisor cannot work with.
    #[error("invalid {field}: {reason}")]
    InvalidValue {
        /// Name of the offending field.
        field: &'static str,
        /// What is wrong with it.
        reason: String,
    },
}

impl ConfigError {
    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use timervisor::ConfigError;
    ///
    /// let err = ConfigError::ExecutableNotFound { path: "/nope".into() };
    /// assert_eq!(err.as_label(), "config_executable_not_found");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            ConfigError::ExecutableNotFound { .. } => "config_executable_not_found",
            ConfigError::InvalidValue { .. } => "config_invalid_value",
        }
    }

    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        ConfigError::InvalidValue {
            field,
            reason: reason.into(),
        }
    }
}

/// # Errors produced when launching the timer process.
///
/// Never fatal to the supervisor: the indicator returns to `Stopped` and the
/// loop keeps accepting toggles.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum SpawnError {
    /// The OS refused to start the program.
    #[error("failed to spawn {program:?}: {source}")]
    Io {
        /// Program that was launched (launcher or executable).
        program: String,
        /// Underlying OS error.
        #[source]
        source: std::io::Error,
    },

    /// The process started but exited before its pid could be observed.
    #[error("spawned process has no pid (exited immediately)")]
    MissingPid,
}

impl SpawnError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            SpawnError::Io { .. } => "spawn_io",
            SpawnError::MissingPid => "spawn_missing_pid",
        }
    }
}

/// # Errors produced by the supervisor loop.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// Every command sender was dropped while the loop was still running.
    #[error("command channel closed before shutdown was requested")]
    ChannelClosed,

    /// OS signal handlers could not be registered.
    #[error("failed to register signal handlers: {0}")]
    Signal(#[from] std::io::Error),
}

impl RuntimeError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            RuntimeError::ChannelClosed => "runtime_channel_closed",
            RuntimeError::Signal(_) => "runtime_signal",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_are_stable() {
        assert_eq!(
            ConfigError::invalid("lanes", "must be at least 1").as_label(),
            "config_invalid_value"
        );
        assert_eq!(SpawnError::MissingPid.as_label(), "spawn_missing_pid");
        assert_eq!(RuntimeError::ChannelClosed.as_label(), "runtime_channel_closed");
    }

    #[test]
    fn invalid_value_message_names_field() {
        let err = ConfigError::invalid("lanes", "must be at least 1");
        assert_eq!(err.to_string(), "invalid lanes: must be at least 1");
    }
}
