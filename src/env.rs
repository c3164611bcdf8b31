use crate::command::ExitCode;
use std::collections::HashMap;
use std::env as stdenv;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Where external programs get their standard streams from.
///
/// `None` means the stream is inherited from the shell itself.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StdioConfig {
    pub input: Option<PathBuf>,
    pub output: Option<PathBuf>,
}

/// Mutable state of one shell session.
///
/// The session contains:
/// - `vars`: environment variables handed to every launched program.
/// - `current_dir`: the working directory, kept in sync with the process by `cd`.
/// - `stdio`: stream configuration installed by `stdio` for later launches.
/// - `exit_code`: set by `exit`; the read loops stop once it is present.
///
/// Only built-in commands mutate a session.
#[derive(Debug, Clone)]
pub struct Session {
    /// Key-value store of environment variables (e.g., PATH, HOME).
    pub vars: HashMap<String, String>,
    /// The current working directory for command execution.
    pub current_dir: PathBuf,
    pub stdio: StdioConfig,
    /// When set, the interpreter should stop and terminate with this code.
    pub exit_code: Option<ExitCode>,
    started: Instant,
}

impl Session {
    /// Capture the current process state into a new `Session`.
    ///
    /// Copies variables from `std::env::vars()` and initializes `current_dir`
    /// from `std::env::current_dir()`.
    pub fn new() -> Self {
        let vars = stdenv::vars().collect();
        let current_dir = stdenv::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self::with_state(vars, current_dir)
    }

    /// Build a session from explicit state without touching the process.
    pub fn with_state(vars: HashMap<String, String>, current_dir: PathBuf) -> Self {
        Self {
            vars,
            current_dir,
            stdio: StdioConfig::default(),
            exit_code: None,
            started: Instant::now(),
        }
    }

    /// Set or override a variable handed to launched programs.
    pub fn set_var(&mut self, key: impl Into<String>, val: impl Into<String>) {
        self.vars.insert(key.into(), val.into());
    }

    /// Resolve `path` against the session working directory.
    pub fn resolve(&self, path: impl AsRef<Path>) -> PathBuf {
        let path = path.as_ref();
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.current_dir.join(path)
        }
    }

    /// Time the session has been alive.
    pub fn uptime(&self) -> std::time::Duration {
        self.started.elapsed()
    }

    pub fn request_exit(&mut self, code: ExitCode) {
        self.exit_code = Some(code);
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
