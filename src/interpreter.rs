use crate::builtin;
use crate::command::{BuiltinCommand, Context, EXIT_FAILURE, EXIT_SUCCESS, ExitCode};
use crate::config::Config;
use crate::env::Session;
use crate::error::DispatchError;
use crate::input::LineSource;
use crate::launcher::Launcher;
use crate::prompt;
use crate::registry::Registry;
use crate::tokenizer::{self, Invocation};
use anyhow::Context as _;
use std::fs;
use std::io::{self, Write};
use std::path::Path;

const COMMENT: char = '#';

/// A line-oriented command interpreter.
///
/// Each line is split into words; the first word is looked up among the
/// registered built-ins and, failing that, started as an external program.
/// Built-ins always take precedence over programs of the same name.
///
/// Example
/// ```
/// use tinysh::Interpreter;
/// let mut sh = Interpreter::default();
/// assert_eq!(sh.execute("# only a comment"), 0);
/// assert_eq!(sh.execute("help"), 0);
/// assert_ne!(sh.execute("cd"), 0);
/// ```
pub struct Interpreter {
    config: Config,
    session: Session,
    registry: Registry,
    launcher: Launcher,
}

impl Interpreter {
    /// Create an interpreter with the given built-ins in a session captured
    /// from the current process.
    pub fn new(config: Config, commands: Vec<Box<dyn BuiltinCommand>>) -> Self {
        Self::with_session(config, commands, Session::new())
    }

    pub fn with_session(
        config: Config,
        commands: Vec<Box<dyn BuiltinCommand>>,
        session: Session,
    ) -> Self {
        let mut registry = Registry::new();
        for cmd in commands {
            registry.register(cmd);
        }
        let launcher = Launcher::new(config.search_path.clone());
        Self {
            config,
            session,
            registry,
            launcher,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Exit code requested by the `exit` built-in, if it has run.
    pub fn exit_requested(&self) -> Option<ExitCode> {
        self.session.exit_code
    }

    /// Background programs that have not been collected yet.
    pub fn background_jobs(&self) -> usize {
        self.launcher.jobs()
    }

    /// Execute one command line, writing built-in output to stdout.
    pub fn execute(&mut self, line: &str) -> ExitCode {
        self.execute_with_output(line, &mut io::stdout())
    }

    /// Execute one command line and return its exit status.
    ///
    /// Never fails: problems are logged and turned into a non-zero status.
    pub fn execute_with_output(&mut self, line: &str, stdout: &mut dyn Write) -> ExitCode {
        if line.is_empty() {
            return EXIT_SUCCESS;
        }
        log::debug!("command = '{}'", line);

        self.launcher.reap();

        let invocation = tokenizer::parse(line, self.config.max_args);
        match invocation.name() {
            None => return EXIT_SUCCESS,
            Some(name) if name.starts_with(COMMENT) => return EXIT_SUCCESS,
            Some(_) => {}
        }

        match self.dispatch(&invocation, stdout) {
            Ok(code) => code,
            Err(e) => {
                log::error!("{:#}", e);
                EXIT_FAILURE
            }
        }
    }

    fn dispatch(
        &mut self,
        invocation: &Invocation,
        stdout: &mut dyn Write,
    ) -> anyhow::Result<ExitCode> {
        let name = invocation.name().unwrap_or_default();
        let args = invocation.args();

        let Some(cmd) = self.registry.lookup(name) else {
            let code = self
                .launcher
                .launch(&invocation.argv, invocation.background, &self.session)?;
            return Ok(code);
        };

        if args.len() < cmd.minimum_args() {
            return Err(DispatchError::NotEnoughArguments {
                name: cmd.name().to_string(),
                required: cmd.minimum_args(),
            }
            .into());
        }

        let mut ctx = Context {
            session: &mut self.session,
            registry: &self.registry,
            stdout: &mut *stdout,
        };
        let code = cmd.execute(args, &mut ctx)?;
        stdout.flush()?;
        Ok(code)
    }

    /// Execute every line of every file in order.
    ///
    /// Unreadable files are reported and skipped, failing lines do not stop
    /// the run. Only `exit` ends it early. Returns the requested exit code, or
    /// 0 when all files were processed.
    pub fn run_batch<P: AsRef<Path>>(&mut self, files: &[P]) -> ExitCode {
        for file in files {
            if let Err(e) = self.run_script(file.as_ref()) {
                log::error!("{:#}", e);
            }
            if let Some(code) = self.exit_requested() {
                return code;
            }
        }
        EXIT_SUCCESS
    }

    /// Execute the lines of a single script file.
    pub fn run_script(&mut self, file: &Path) -> anyhow::Result<()> {
        let bytes = fs::read(file)
            .with_context(|| format!("failed to read `{}'", file.display()))?;
        let contents = String::from_utf8_lossy(&bytes);

        for line in contents.lines() {
            self.execute(line);
            if self.exit_requested().is_some() {
                break;
            }
        }
        Ok(())
    }

    /// Prompt, read and execute lines until `exit` runs or input ends.
    ///
    /// Returns the requested exit code, or 0 at end of input.
    pub fn run_interactive(&mut self, source: &mut dyn LineSource) -> io::Result<ExitCode> {
        let host = prompt::host_name();
        loop {
            if let Some(code) = self.exit_requested() {
                return Ok(code);
            }
            self.launcher.reap();

            let prompt = prompt::render(&host, &self.session.current_dir);
            let Some(line) = source.read_line(&prompt)? else {
                return Ok(EXIT_SUCCESS);
            };
            if line.is_empty() {
                continue;
            }
            self.execute(&line);
        }
    }
}

impl Default for Interpreter {
    /// Create an interpreter with the default configuration and every
    /// built-in: `cd`, `exit`, `stdio`, `write`, `help` and `time`.
    fn default() -> Self {
        Self::new(Config::default(), builtin::all())
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::builtin::tests::{lock_current_dir, make_unique_temp_dir};
    use crate::input::RawTerminal;
    use std::cell::Cell;
    use std::io::Cursor;
    use std::path::PathBuf;
    use std::rc::Rc;
    use std::time::{Duration, Instant};

    /// Built-in that counts its invocations.
    struct Counter {
        name: &'static str,
        minimum: usize,
        code: ExitCode,
        calls: Rc<Cell<usize>>,
    }

    impl BuiltinCommand for Counter {
        fn name(&self) -> &str {
            self.name
        }

        fn description(&self) -> &str {
            "counts calls"
        }

        fn minimum_args(&self) -> usize {
            self.minimum
        }

        fn execute(&self, args: &[String], ctx: &mut Context<'_>) -> anyhow::Result<ExitCode> {
            self.calls.set(self.calls.get() + 1);
            writeln!(ctx.stdout, "{}", args.join(","))?;
            Ok(self.code)
        }
    }

    fn counter(
        name: &'static str,
        minimum: usize,
        code: ExitCode,
    ) -> (Box<dyn BuiltinCommand>, Rc<Cell<usize>>) {
        let calls = Rc::new(Cell::new(0));
        let cmd: Box<dyn BuiltinCommand> = Box::new(Counter {
            name,
            minimum,
            code,
            calls: calls.clone(),
        });
        (cmd, calls)
    }

    fn interpreter_in(
        dir: &Path,
        config: Config,
        commands: Vec<Box<dyn BuiltinCommand>>,
    ) -> Interpreter {
        let session = Session::with_state(std::env::vars().collect(), dir.to_path_buf());
        Interpreter::with_session(config, commands, session)
    }

    fn default_in(dir: &Path) -> Interpreter {
        interpreter_in(dir, Config::default(), builtin::all())
    }

    fn script(dir: &Path, name: &str, body: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, body).expect("write script");
        path
    }

    #[test]
    fn blank_and_comment_lines_do_nothing() {
        let dir = make_unique_temp_dir("interp_blank").unwrap();
        let (cmd, calls) = counter("count", 0, 9);
        let mut sh = interpreter_in(&dir, Config::default(), vec![cmd]);

        for line in ["", " ", "      ", "#count", "# count a b", "   #x y", "&"] {
            assert_eq!(sh.execute_with_output(line, &mut Vec::new()), 0, "{:?}", line);
        }
        assert_eq!(calls.get(), 0);
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn minimum_args_are_enforced() {
        let dir = make_unique_temp_dir("interp_min").unwrap();
        let (cmd, calls) = counter("count", 2, 42);
        let mut sh = interpreter_in(&dir, Config::default(), vec![cmd]);

        let mut out = Vec::new();
        assert_eq!(sh.execute_with_output("count a", &mut out), EXIT_FAILURE);
        assert_eq!(calls.get(), 0);
        assert!(out.is_empty());

        assert_eq!(sh.execute_with_output("count a b", &mut out), 42);
        assert_eq!(sh.execute_with_output("count a b c", &mut out), 42);
        assert_eq!(calls.get(), 2);
        assert_eq!(String::from_utf8(out).unwrap(), "a,b\na,b,c\n");
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn last_registration_is_reachable() {
        let dir = make_unique_temp_dir("interp_dup").unwrap();
        let (first, first_calls) = counter("dup", 0, 1);
        let (second, second_calls) = counter("dup", 0, 2);
        let mut sh = interpreter_in(&dir, Config::default(), vec![first, second]);

        assert_eq!(sh.registry().len(), 1);
        assert_eq!(sh.execute_with_output("dup", &mut Vec::new()), 2);
        assert_eq!(first_calls.get(), 0);
        assert_eq!(second_calls.get(), 1);
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn builtins_shadow_programs() {
        let dir = make_unique_temp_dir("interp_shadow").unwrap();
        let (cmd, calls) = counter("sh", 0, 17);
        let mut sh = interpreter_in(&dir, Config::default(), vec![cmd]);

        assert_eq!(sh.execute_with_output("sh -c true", &mut Vec::new()), 17);
        assert_eq!(calls.get(), 1);
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn builtin_errors_stay_off_stdout() {
        let dir = make_unique_temp_dir("interp_bad_args").unwrap();
        let mut sh = default_in(&dir);

        let mut out = Vec::new();
        assert_eq!(sh.execute_with_output("exit soon", &mut out), EXIT_FAILURE);
        assert!(out.is_empty());
        assert_eq!(sh.exit_requested(), None);

        assert_eq!(sh.execute_with_output("exit -1", &mut out), -1);
        assert!(out.is_empty());
        assert_eq!(sh.exit_requested(), Some(-1));
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn unknown_command_fails() {
        let dir = make_unique_temp_dir("interp_unknown").unwrap();
        let mut sh = default_in(&dir);
        assert_eq!(sh.execute("tinysh_surely_missing_cmd arg"), EXIT_FAILURE);
        assert_eq!(sh.background_jobs(), 0);
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn foreground_returns_exit_status() {
        let dir = make_unique_temp_dir("interp_fg").unwrap();
        let exit7 = script(&dir, "exit7.sh", "exit 7\n");
        let mut sh = default_in(&dir);

        assert_eq!(sh.execute(&format!("/bin/sh {}", exit7.display())), 7);
        // found through the fallback directory
        assert_eq!(sh.execute("sh exit7.sh"), 7);
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn background_returns_success_immediately() {
        let dir = make_unique_temp_dir("interp_bg").unwrap();
        let slow = script(&dir, "slow.sh", "sleep 2\nexit 9\n");
        let mut sh = default_in(&dir);

        let started = Instant::now();
        assert_eq!(sh.execute(&format!("/bin/sh {} &", slow.display())), 0);
        assert!(started.elapsed() < Duration::from_secs(2));
        assert_eq!(sh.background_jobs(), 1);
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn extra_words_are_dropped() {
        let dir = make_unique_temp_dir("interp_trunc").unwrap();
        let (cmd, calls) = counter("count", 2, 0);
        let config = Config {
            max_args: 2,
            ..Config::default()
        };
        let mut sh = interpreter_in(&dir, config, vec![cmd]);

        // only `count a` fits, which is one argument short
        assert_eq!(sh.execute_with_output("count a b", &mut Vec::new()), EXIT_FAILURE);
        assert_eq!(calls.get(), 0);
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn batch_continues_after_errors() {
        let dir = make_unique_temp_dir("interp_batch").unwrap();
        let out = dir.join("out.txt");
        let first = script(
            &dir,
            "first.sh",
            &format!("tinysh_surely_missing_cmd\nwrite {} hello\n", out.display()),
        );
        let second = script(&dir, "second.sh", "write second.txt again\r\n");
        let missing = dir.join("missing.sh");
        let mut sh = default_in(&dir);

        let code = sh.run_batch(&[missing, first, second]);

        assert_eq!(code, 0);
        assert_eq!(fs::read_to_string(&out).unwrap(), "hello\n");
        assert_eq!(fs::read_to_string(dir.join("second.txt")).unwrap(), "again\n");
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn batch_stops_at_exit() {
        let dir = make_unique_temp_dir("interp_batch_exit").unwrap();
        let first = script(&dir, "first.sh", "exit 3\nwrite never.txt x\n");
        let second = script(&dir, "second.sh", "write never2.txt x\n");
        let mut sh = default_in(&dir);

        assert_eq!(sh.run_batch(&[first, second]), 3);
        assert!(!dir.join("never.txt").exists());
        assert!(!dir.join("never2.txt").exists());
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn interactive_runs_until_exit() {
        let dir = make_unique_temp_dir("interp_repl").unwrap();
        let mut sh = default_in(&dir);
        let input = b"write a.txt one\n\nbogus_cmd_tinysh\nexit 2\nwrite b.txt two\n".to_vec();
        let mut term = RawTerminal::new(Cursor::new(input), Vec::new());

        assert_eq!(sh.run_interactive(&mut term).unwrap(), 2);
        assert_eq!(fs::read_to_string(dir.join("a.txt")).unwrap(), "one\n");
        assert!(!dir.join("b.txt").exists());

        let echo = String::from_utf8(term.into_echo()).unwrap();
        assert!(echo.contains(&dir.display().to_string()));
        assert!(echo.contains(" # "));
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn interactive_ends_at_eof() {
        let dir = make_unique_temp_dir("interp_eof").unwrap();
        let mut sh = default_in(&dir);
        let mut term = RawTerminal::new(Cursor::new(b"time\n".to_vec()), Vec::new());
        assert_eq!(sh.run_interactive(&mut term).unwrap(), 0);
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn cd_changes_session_directory() {
        let _lock = lock_current_dir();
        let orig = std::env::current_dir().unwrap();
        let dir = make_unique_temp_dir("interp_cd").unwrap();
        fs::create_dir_all(dir.join("inner")).unwrap();
        let mut sh = default_in(&dir);

        assert_eq!(sh.execute("cd inner"), 0);
        assert_eq!(
            sh.session().current_dir,
            fs::canonicalize(dir.join("inner")).unwrap()
        );
        assert_eq!(sh.execute("write here.txt x"), 0);
        assert!(dir.join("inner").join("here.txt").exists());

        std::env::set_current_dir(orig).expect("failed to restore cwd");
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn stdio_redirects_later_launches() {
        let dir = make_unique_temp_dir("interp_stdio").unwrap();
        fs::write(dir.join("in.txt"), "").unwrap();
        let hello = script(&dir, "hello.sh", "echo redirected\n");
        let mut sh = default_in(&dir);

        assert_eq!(sh.execute("stdio in.txt log.txt"), 0);
        assert_eq!(sh.execute(&format!("/bin/sh {}", hello.display())), 0);
        assert_eq!(
            fs::read_to_string(dir.join("log.txt")).unwrap(),
            "redirected\n"
        );
        let _ = fs::remove_dir_all(dir);
    }
}
