use crate::command::{EXIT_SUCCESS, ExitCode};
use crate::env::{Session, StdioConfig};
use crate::error::DispatchError;
use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};

/// Directory tried when a command is neither a built-in nor a direct path.
pub const DEFAULT_SEARCH_DIR: &str = "/bin";

/// A program started with `&` that has not been collected yet.
struct Job {
    name: String,
    child: Child,
}

/// Starts external programs for the dispatcher.
///
/// Every launch first treats the command name as a path of its own (relative
/// names resolve against the session working directory), then retries with
/// each directory of the search path prepended. Background children are kept
/// in a job list and collected by [`Launcher::reap`].
pub struct Launcher {
    search_path: Vec<PathBuf>,
    jobs: Vec<Job>,
}

impl Launcher {
    pub fn new(search_path: Vec<PathBuf>) -> Self {
        Self {
            search_path,
            jobs: Vec::new(),
        }
    }

    /// Launch `argv[0]` with the remaining arguments.
    ///
    /// In the foreground this blocks until the child exits and returns its exit
    /// code. In the background it returns 0 as soon as the child is running.
    pub fn launch(
        &mut self,
        argv: &[String],
        background: bool,
        session: &Session,
    ) -> Result<ExitCode, DispatchError> {
        let Some((name, args)) = argv.split_first() else {
            return Err(DispatchError::Launch {
                name: String::new(),
                source: io::Error::new(io::ErrorKind::InvalidInput, "empty command"),
            });
        };

        let launch_error = |source: io::Error| DispatchError::Launch {
            name: name.clone(),
            source,
        };

        let redirects = Redirects::open(&session.stdio)?;

        let mut last_error = io::Error::from(io::ErrorKind::NotFound);
        for candidate in self.candidates(name, session) {
            match spawn(&candidate, name, args, session, &redirects) {
                Ok(mut child) => {
                    log::debug!("started `{}' as pid {}", candidate.display(), child.id());
                    if background {
                        self.jobs.push(Job {
                            name: name.clone(),
                            child,
                        });
                        return Ok(EXIT_SUCCESS);
                    }
                    let status = child.wait().map_err(launch_error)?;
                    return Ok(exit_code(status));
                }
                Err(e) => {
                    log::debug!("cannot start `{}': {}", candidate.display(), e);
                    last_error = e;
                }
            }
        }
        Err(launch_error(last_error))
    }

    /// Collect every background child that has terminated, without blocking.
    ///
    /// Returns how many children were collected.
    pub fn reap(&mut self) -> usize {
        let before = self.jobs.len();
        self.jobs.retain_mut(|job| match job.child.try_wait() {
            Ok(Some(status)) => {
                log::info!(
                    "[{}] {} finished with status {}",
                    job.child.id(),
                    job.name,
                    exit_code(status)
                );
                false
            }
            Ok(None) => true,
            Err(e) => {
                log::warn!("[{}] {}: can't query status: {}", job.child.id(), job.name, e);
                false
            }
        });
        before - self.jobs.len()
    }

    /// Number of background children still being tracked.
    pub fn jobs(&self) -> usize {
        self.jobs.len()
    }

    fn candidates(&self, name: &str, session: &Session) -> Vec<PathBuf> {
        std::iter::once(session.resolve(name))
            .chain(self.search_path.iter().map(|dir| dir.join(name)))
            .collect()
    }
}

impl Default for Launcher {
    fn default() -> Self {
        Self::new(vec![PathBuf::from(DEFAULT_SEARCH_DIR)])
    }
}

fn spawn(
    path: &Path,
    name: &str,
    args: &[String],
    session: &Session,
    redirects: &Redirects,
) -> io::Result<Child> {
    let (stdin, stdout, stderr) = redirects.handles()?;
    let mut cmd = Command::new(path);
    cmd.args(args)
        .stdin(stdin)
        .stdout(stdout)
        .stderr(stderr)
        .envs(session.vars.iter().map(|(k, v)| (k.as_str(), v.as_str())))
        .current_dir(&session.current_dir);
    set_arg0(&mut cmd, name);
    cmd.spawn()
}

#[cfg(unix)]
fn set_arg0(cmd: &mut Command, name: &str) {
    use std::os::unix::process::CommandExt;
    cmd.arg0(name);
}

#[cfg(not(unix))]
fn set_arg0(_cmd: &mut Command, _name: &str) {}

/// Files configured by `stdio`, opened once per launch.
struct Redirects {
    input: Option<File>,
    output: Option<File>,
}

impl Redirects {
    fn open(config: &StdioConfig) -> Result<Self, DispatchError> {
        let input = match &config.input {
            Some(path) => Some(File::open(path).map_err(|e| redirect_error(path, e))?),
            None => None,
        };
        let output = match &config.output {
            Some(path) => Some(open_output(path).map_err(|e| redirect_error(path, e))?),
            None => None,
        };
        Ok(Self { input, output })
    }

    /// Standard input, output and error for a single spawn attempt.
    ///
    /// Stdout and stderr share the output file.
    fn handles(&self) -> io::Result<(Stdio, Stdio, Stdio)> {
        let stdin = match &self.input {
            Some(file) => Stdio::from(file.try_clone()?),
            None => Stdio::inherit(),
        };
        let (stdout, stderr) = match &self.output {
            Some(file) => (Stdio::from(file.try_clone()?), Stdio::from(file.try_clone()?)),
            None => (Stdio::inherit(), Stdio::inherit()),
        };
        Ok((stdin, stdout, stderr))
    }
}

fn redirect_error(path: &Path, source: io::Error) -> DispatchError {
    DispatchError::Redirect {
        path: path.to_path_buf(),
        source,
    }
}

pub(crate) fn open_output(path: &Path) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

fn exit_code(status: ExitStatus) -> ExitCode {
    match status.code() {
        Some(x) => x,
        None => terminated_by_signal(status),
    }
}

#[cfg(unix)]
fn terminated_by_signal(exit_status: ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;
    if let Some(signal) = ExitStatusExt::signal(&exit_status) {
        128 + signal
    } else if ExitStatusExt::core_dumped(&exit_status) {
        255
    } else {
        -1
    }
}

#[cfg(not(unix))]
fn terminated_by_signal(_exit_status: ExitStatus) -> i32 {
    -1
}
