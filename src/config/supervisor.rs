//! # Supervisor timing configuration.
//!
//! Provides [`SupervisorConfig`], the centralized timing and capacity settings
//! of the supervisor loop.
//!
//! ## Sentinel values
//! - `grace = 0s` → no cooperative wait, the child is killed right after the termination request
//! - `poll_interval = 0s` → clamped to 1ms (a ticker cannot have a zero period)
//! - capacities `0` → clamped to 1

use std::time::Duration;

/// Timing and capacity settings for the supervisor runtime.
///
/// ## Field semantics
/// - `grace`: Maximum wait for the child to exit after the termination request
/// - `poll_interval`: Period of the health-poll ticker
/// - `blink_count`: Number of toggles in the startup self-test
/// - `blink_interval`: Pause after each self-test toggle
/// - `command_capacity`: Size of the loop's command queue
/// - `bus_capacity`: Event bus ring buffer size
#[derive(Clone, Debug)]
pub struct SupervisorConfig {
    /// Maximum time to wait for graceful exit before force-killing the child.
    ///
    /// When a stop is requested:
    /// - the child receives `SIGTERM`
    /// - the supervisor waits up to `grace` for it to exit
    /// - if it is still alive, it receives `SIGKILL`
    pub grace: Duration,

    /// Interval between liveness checks of the tracked child.
    pub poll_interval: Duration,

    /// Number of indicator toggles performed during the startup self-test.
    pub blink_count: u32,

    /// Delay after each self-test toggle.
    pub blink_interval: Duration,

    /// Capacity of the command queue feeding the loop.
    ///
    /// Toggles arriving while a stop is in progress wait here.
    pub command_capacity: usize,

    /// Capacity of the event bus broadcast channel ring buffer.
    pub bus_capacity: usize,
}

impl SupervisorConfig {
    /// Returns the poll interval clamped to a minimum of 1ms.
    #[inline]
    pub fn poll_interval_clamped(&self) -> Duration {
        self.poll_interval.max(Duration::from_millis(1))
    }

    /// Returns the command queue capacity clamped to a minimum of 1.
    #[inline]
    pub fn command_capacity_clamped(&self) -> usize {
        self.command_capacity.max(1)
    }

    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

impl Default for SupervisorConfig {
    /// Default configuration:
    ///
    /// - `grace = 5s`
    /// - `poll_interval = 500ms`
    /// - `blink_count = 3`, `blink_interval = 250ms`
    /// - `command_capacity = 64`
    /// - `bus_capacity = 256`
    fn default() -> Self {
        Self {
            grace: Duration::from_secs(5),
            poll_interval: Duration::from_millis(500),
            blink_count: 3,
            blink_interval: Duration::from_millis(250),
            command_capacity: 64,
            bus_capacity: 256,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_unit() {
        let cfg = SupervisorConfig::default();
        assert_eq!(cfg.grace, Duration::from_secs(5));
        assert_eq!(cfg.poll_interval, Duration::from_millis(500));
        assert_eq!(cfg.blink_count, 3);
        assert_eq!(cfg.blink_interval, Duration::from_millis(250));
    }

    #[test]
    fn zero_values_are_clamped() {
        let cfg = SupervisorConfig {
            poll_interval: Duration::ZERO,
            command_capacity: 0,
            bus_capacity: 0,
            ..SupervisorConfig::default()
        };
        assert_eq!(cfg.poll_interval_clamped(), Duration::from_millis(1));
        assert_eq!(cfg.command_capacity_clamped(), 1);
        assert_eq!(cfg.bus_capacity_clamped(), 1);
    }
}
