//! # Timer server configuration.
//!
//! [`ServerConfig`] describes how to launch the external timer process. It is
//! built from a plain [`ServerParams`] record by [`ServerConfig::new`], which
//! checks every invariant once; afterwards the value is immutable and always
//! valid.
//!
//! ## Example
//! ```no_run
//! use timervisor::{ServerConfig, ServerParams};
//!
//! let cfg = ServerConfig::new(ServerParams {
//!     executable: "/opt/timer/derby-timer.jar".into(),
//!     launcher: Some("java -jar".into()),
//!     url: "https://derby.local/".into(),
//!     lanes: 4,
//!     ..ServerParams::default()
//! })?;
//! assert_eq!(cfg.lanes(), 4);
//! # Ok::<(), timervisor::ConfigError>(())
//! ```

use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

/// Unvalidated launch parameters, as read from the command line or environment.
#[derive(Clone, Debug)]
pub struct ServerParams {
    /// Timer executable (script, binary or archive handed to the launcher).
    pub executable: PathBuf,
    /// Optional interpreter command placed before the executable, split on whitespace.
    pub launcher: Option<String>,
    /// Directory the timer writes its own logs to.
    pub log_dir: PathBuf,
    /// Remote server URL (always the last argument).
    pub url: String,
    pub username: String,
    pub password: String,
    /// Timer device identifier passed with `-d`.
    pub timer_type: String,
    /// Number of lanes on the track.
    pub lanes: u32,
    /// Append `-simulate-timer`.
    pub simulate: bool,
    /// Additional arguments placed after the fixed flags.
    pub extra_args: Vec<String>,
}

impl Default for ServerParams {
    fn default() -> Self {
        Self {
            executable: PathBuf::new(),
            launcher: None,
            log_dir: PathBuf::from("/tmp"),
            url: String::new(),
            username: "Timer".to_string(),
            password: String::new(),
            timer_type: "NewBold".to_string(),
            lanes: 4,
            simulate: false,
            extra_args: Vec::new(),
        }
    }
}

/// Validated, immutable launch configuration.
#[derive(Clone)]
pub struct ServerConfig {
    executable: PathBuf,
    launcher: Vec<String>,
    log_dir: PathBuf,
    url: String,
    username: String,
    password: String,
    timer_type: String,
    lanes: u32,
    simulate: bool,
    extra_args: Vec<String>,
}

impl ServerConfig {
    /// Validates `params` and freezes them.
    ///
    /// ### Errors
    /// - [`ConfigError::ExecutableNotFound`] if the executable is not an existing file.
    /// - [`ConfigError::InvalidValue`] for an empty URL, zero lanes or a blank launcher.
    pub fn new(params: ServerParams) -> Result<Self, ConfigError> {
        if !params.executable.is_file() {
            return Err(ConfigError::ExecutableNotFound {
                path: params.executable,
            });
        }
        if params.url.trim().is_empty() {
            return Err(ConfigError::invalid("url", "must not be empty"));
        }
        if params.lanes == 0 {
            return Err(ConfigError::invalid("lanes", "must be at least 1"));
        }
        let launcher: Vec<String> = match params.launcher {
            Some(cmd) => {
                let parts: Vec<String> = cmd.split_whitespace().map(str::to_owned).collect();
                if parts.is_empty() {
                    return Err(ConfigError::invalid("launcher", "must not be blank"));
                }
                parts
            }
            None => Vec::new(),
        };

        Ok(Self {
            executable: params.executable,
            launcher,
            log_dir: params.log_dir,
            url: params.url,
            username: params.username,
            password: params.password,
            timer_type: params.timer_type,
            lanes: params.lanes,
            simulate: params.simulate,
            extra_args: params.extra_args,
        })
    }

    pub fn executable(&self) -> &Path {
        &self.executable
    }

    /// Interpreter command words; empty when the executable runs directly.
    pub fn launcher(&self) -> &[String] {
        &self.launcher
    }

    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    pub fn timer_type(&self) -> &str {
        &self.timer_type
    }

    pub fn lanes(&self) -> u32 {
        self.lanes
    }

    pub fn simulate(&self) -> bool {
        self.simulate
    }

    pub fn extra_args(&self) -> &[String] {
        &self.extra_args
    }
}

impl fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerConfig")
            .field("executable", &self.executable)
            .field("launcher", &self.launcher)
            .field("log_dir", &self.log_dir)
            .field("url", &self.url)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("timer_type", &self.timer_type)
            .field("lanes", &self.lanes)
            .field("simulate", &self.simulate)
            .field("extra_args", &self.extra_args)
            .finish()
    }
}
