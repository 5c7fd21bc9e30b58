//! # Command-line arguments.
//!
//! [`Args`] is the `clap` surface of the `timervisor` binary. It only gathers
//! raw values; [`Args::into_configs`] hands them to the validating constructors.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use super::{HardwareConfig, ServerConfig, ServerParams, SupervisorConfig};
use crate::error::ConfigError;

/// Button-driven supervisor for the race timer process.
#[derive(Parser, Debug, Clone)]
#[command(name = "timervisor", version, about)]
pub struct Args {
    /// Timer executable to launch.
    #[arg(long, short = 'e', env = "TIMER_EXECUTABLE")]
    pub executable: PathBuf,

    /// Interpreter placed before the executable (e.g. "java -jar").
    #[arg(long, env = "TIMER_LAUNCHER")]
    pub launcher: Option<String>,

    /// Directory for the timer's own logs.
    #[arg(long, default_value = "/tmp", env = "TIMER_LOG_DIR")]
    pub log_dir: PathBuf,

    /// Race server URL.
    #[arg(long, env = "TIMER_URL")]
    pub url: String,

    #[arg(long, short = 'u', default_value = "Timer", env = "TIMER_USERNAME")]
    pub username: String,

    #[arg(long, short = 'p', default_value = "", env = "TIMER_PASSWORD", hide_env_values = true)]
    pub password: String,

    /// Timer device type passed with `-d`.
    #[arg(long, default_value = "NewBold")]
    pub timer_type: String,

    #[arg(long, default_value_t = 4)]
    pub lanes: u32,

    /// Run the timer in simulation mode.
    #[arg(long)]
    pub simulate_timer: bool,

    /// Extra argument forwarded to the timer (repeatable).
    #[arg(long = "extra-arg", value_name = "ARG")]
    pub extra_args: Vec<String>,

    #[arg(long, default_value_t = HardwareConfig::DEFAULT_BUTTON_PIN)]
    pub button_pin: u8,

    #[arg(long, default_value_t = HardwareConfig::DEFAULT_LED_RUNNING_PIN)]
    pub led_running_pin: u8,

    #[arg(long, default_value_t = HardwareConfig::DEFAULT_LED_STOPPED_PIN)]
    pub led_stopped_pin: u8,

    /// Minimum spacing between button presses, in milliseconds.
    #[arg(long, default_value_t = 100)]
    pub debounce_ms: u64,

    /// Grace period before a stopping timer is killed, in milliseconds.
    #[arg(long, default_value_t = 5000)]
    pub grace_ms: u64,

    /// Health poll period, in milliseconds.
    #[arg(long, default_value_t = 500)]
    pub poll_ms: u64,

    /// Log filter used when RUST_LOG is not set.
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

impl Args {
    /// Validates the raw arguments into the three configuration records.
    pub fn into_configs(
        self,
    ) -> Result<(HardwareConfig, ServerConfig, SupervisorConfig), ConfigError> {
        let hardware = HardwareConfig::new(
            self.button_pin,
            self.led_running_pin,
            self.led_stopped_pin,
            Duration::from_millis(self.debounce_ms),
        )?;

        let server = ServerConfig::new(ServerParams {
            executable: self.executable,
            launcher: self.launcher,
            log_dir: self.log_dir,
            url: self.url,
            username: self.username,
            password: self.password,
            timer_type: self.timer_type,
            lanes: self.lanes,
            simulate: self.simulate_timer,
            extra_args: self.extra_args,
        })?;

        let supervisor = SupervisorConfig {
            grace: Duration::from_millis(self.grace_ms),
            poll_interval: Duration::from_millis(self.poll_ms),
            ..SupervisorConfig::default()
        };

        Ok((hardware, server, supervisor))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_defaults() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let exe = file.path().to_str().unwrap();
        let args = Args::try_parse_from(["timervisor", "-e", exe, "--url", "https://x/"]).unwrap();

        let (hw, server, sup) = args.into_configs().unwrap();
        assert_eq!(hw, HardwareConfig::default());
        assert_eq!(server.lanes(), 4);
        assert_eq!(server.timer_type(), "NewBold");
        assert!(!server.simulate());
        assert_eq!(sup.grace, Duration::from_secs(5));
        assert_eq!(sup.poll_interval, Duration::from_millis(500));
    }

    #[test]
    fn collects_extra_args_and_flags() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let exe = file.path().to_str().unwrap();
        let args = Args::try_parse_from([
            "timervisor",
            "-e",
            exe,
            "--url",
            "https://x/",
            "--simulate-timer",
            "--extra-arg",
            "-v",
            "--extra-arg",
            "-t",
            "--lanes",
            "6",
        ])
        .unwrap();

        let (_, server, _) = args.into_configs().unwrap();
        assert!(server.simulate());
        assert_eq!(server.lanes(), 6);
        assert_eq!(server.extra_args(), ["-v".to_string(), "-t".to_string()]);
    }

    #[test]
    fn missing_executable_fails_validation() {
        let args = Args::try_parse_from(["timervisor", "-e", "/no/such/timer", "--url", "https://x/"])
            .unwrap();
        let err = args.into_configs().unwrap_err();
        assert!(matches!(err, ConfigError::ExecutableNotFound { .. }));
    }
}
