use crate::command::{BuiltinCommand, Context, EXIT_SUCCESS, ExitCode};
use crate::launcher::open_output;
use anyhow::{Context as _, Result};
use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::PathBuf;

/// Every built-in shipped with the shell, ready to be registered.
///
/// Built-ins run in-process and receive the words after the command name
/// unchanged; the dispatcher has already checked the minimum count.
pub fn all() -> Vec<Box<dyn BuiltinCommand>> {
    vec![
        Box::new(ChangeDir),
        Box::new(Exit),
        Box::new(StdioSetup),
        Box::new(WriteFile),
        Box::new(Help),
        Box::new(Time),
    ]
}

/// `cd DIR`: change the current working directory.
pub struct ChangeDir;

impl BuiltinCommand for ChangeDir {
    fn name(&self) -> &str {
        "cd"
    }

    fn description(&self) -> &str {
        "Change the current working directory"
    }

    fn minimum_args(&self) -> usize {
        1
    }

    fn execute(&self, args: &[String], ctx: &mut Context<'_>) -> Result<ExitCode> {
        let target = args.first().context("cd: missing directory")?;
        let new_dir = ctx.session.resolve(target);

        let canonical = fs::canonicalize(&new_dir)
            .with_context(|| format!("cd: can't canonicalize {}", new_dir.display()))?;

        env::set_current_dir(&canonical)
            .with_context(|| format!("cd: can't chdir to {}", canonical.display()))?;
        ctx.session
            .set_var("PWD", canonical.to_string_lossy());
        ctx.session.current_dir = canonical;
        Ok(EXIT_SUCCESS)
    }
}

/// `exit [CODE]`: stop the interpreter, 0 when no status is given.
pub struct Exit;

impl BuiltinCommand for Exit {
    fn name(&self) -> &str {
        "exit"
    }

    fn description(&self) -> &str {
        "Exit the shell interpreter"
    }

    fn minimum_args(&self) -> usize {
        0
    }

    fn execute(&self, args: &[String], ctx: &mut Context<'_>) -> Result<ExitCode> {
        let code = match args.first() {
            Some(word) => word
                .parse::<ExitCode>()
                .with_context(|| format!("exit: invalid status `{}'", word))?,
            None => EXIT_SUCCESS,
        };
        ctx.session.request_exit(code);
        Ok(code)
    }
}

/// Keyword that puts a stream back to the shell's own.
const INHERIT: &str = "inherit";

/// `stdio INPUT OUTPUT`: change the standard streams of launched programs.
///
/// Input is read from INPUT; output and error are appended to OUTPUT. Either
/// may be `inherit`. Both files are opened here so a bad path is reported now
/// and the previous configuration stays in place.
pub struct StdioSetup;

impl BuiltinCommand for StdioSetup {
    fn name(&self) -> &str {
        "stdio"
    }

    fn description(&self) -> &str {
        "Change the standard input/output of launched programs"
    }

    fn minimum_args(&self) -> usize {
        2
    }

    fn execute(&self, args: &[String], ctx: &mut Context<'_>) -> Result<ExitCode> {
        let [input, output, ..] = args else {
            anyhow::bail!("stdio: expected INPUT and OUTPUT");
        };
        let input = match input.as_str() {
            INHERIT => None,
            path => {
                let path = ctx.session.resolve(path);
                File::open(&path)
                    .with_context(|| format!("stdio: can't open {}", path.display()))?;
                Some(path)
            }
        };
        let output = match output.as_str() {
            INHERIT => None,
            path => {
                let path = ctx.session.resolve(path);
                open_output(&path)
                    .with_context(|| format!("stdio: can't open {}", path.display()))?;
                Some(path)
            }
        };

        ctx.session.stdio.input = input;
        ctx.session.stdio.output = output;
        Ok(EXIT_SUCCESS)
    }
}

/// `write FILE TEXT...`: replace FILE with the words joined by spaces.
pub struct WriteFile;

impl BuiltinCommand for WriteFile {
    fn name(&self) -> &str {
        "write"
    }

    fn description(&self) -> &str {
        "Write data to a file"
    }

    fn minimum_args(&self) -> usize {
        2
    }

    fn execute(&self, args: &[String], ctx: &mut Context<'_>) -> Result<ExitCode> {
        let (file, text) = args.split_first().context("write: missing file name")?;
        let path: PathBuf = ctx.session.resolve(file);
        let mut contents = text.join(" ");
        contents.push('\n');
        fs::write(&path, contents)
            .with_context(|| format!("write: can't write {}", path.display()))?;
        Ok(EXIT_SUCCESS)
    }
}

pub struct Help;

impl BuiltinCommand for Help {
    fn name(&self) -> &str {
        "help"
    }

    fn description(&self) -> &str {
        "Print the list of built-in commands"
    }

    fn minimum_args(&self) -> usize {
        0
    }

    fn execute(&self, _args: &[String], ctx: &mut Context<'_>) -> Result<ExitCode> {
        for cmd in ctx.registry.iter() {
            writeln!(
                ctx.stdout,
                "{:<8} [{}] {}",
                cmd.name(),
                cmd.minimum_args(),
                cmd.description()
            )?;
        }
        Ok(EXIT_SUCCESS)
    }
}

/// `time`: print the current time and how long the shell has been running.
pub struct Time;

impl BuiltinCommand for Time {
    fn name(&self) -> &str {
        "time"
    }

    fn description(&self) -> &str {
        "Print the current time and session uptime"
    }

    fn minimum_args(&self) -> usize {
        0
    }

    fn execute(&self, _args: &[String], ctx: &mut Context<'_>) -> Result<ExitCode> {
        let now = chrono::Local::now();
        writeln!(ctx.stdout, "{}", now.format("%a %b %e %H:%M:%S %Y"))?;
        writeln!(ctx.stdout, "up {:.3}s", ctx.session.uptime().as_secs_f64())?;
        Ok(EXIT_SUCCESS)
    }
}
