use crate::env::Session;
use crate::registry::Registry;
use anyhow::Result;
use std::io::Write;

/// Conventional process exit code type used by this crate.
///
/// A value of 0 indicates success; any non-zero value indicates failure.
/// This mirrors the convention used by POSIX shells and many command-line tools.
pub type ExitCode = i32;

pub const EXIT_SUCCESS: ExitCode = 0;
pub const EXIT_FAILURE: ExitCode = 1;

/// Everything a built-in may touch while it runs.
///
/// The registry is only readable here: handlers can enumerate their siblings
/// (as `help` does) but never add or remove commands.
pub struct Context<'a> {
    pub session: &'a mut Session,
    pub registry: &'a Registry,
    pub stdout: &'a mut dyn Write,
}

/// Object-safe contract shared by every built-in command.
///
/// The dispatcher checks [`BuiltinCommand::minimum_args`] before calling
/// [`BuiltinCommand::execute`], so handlers can rely on having at least that
/// many arguments.
pub trait BuiltinCommand {
    /// Canonical name of the command, e.g. "cd" or "help".
    fn name(&self) -> &str;

    /// One-line summary shown by `help`.
    fn description(&self) -> &str;

    /// Number of arguments required, not counting the command name.
    fn minimum_args(&self) -> usize;

    /// Executes the command with the arguments following its name.
    ///
    /// Return value should follow shell conventions: 0 for success, non-zero for error.
    fn execute(&self, args: &[String], ctx: &mut Context<'_>) -> Result<ExitCode>;
}
