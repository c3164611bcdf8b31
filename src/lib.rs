//! A small line-oriented command interpreter.
//!
//! Every input line is split on spaces into a command name and its arguments.
//! The name is resolved against a fixed set of built-in commands first; when
//! no built-in matches, the name is started as an external program, directly
//! by path and then from a configurable list of fallback directories. A
//! trailing `&` starts the program in the background.
//!
//! The main entry point is [`Interpreter`], which runs single lines
//! ([`Interpreter::execute`]), whole script files ([`Interpreter::run_batch`])
//! or an interactive prompt loop ([`Interpreter::run_interactive`]). The public
//! modules [`command`] and [`env`] expose the traits and types needed to write
//! additional built-ins.

mod builtin;
pub mod command;
pub mod config;
pub mod env;
pub mod error;
pub mod input;
mod interpreter;
pub mod launcher;
pub mod line_editor;
mod prompt;
pub mod registry;
pub mod tokenizer;

pub use builtin::all as builtins;
pub use config::{Args, Config};
/// Just a convenient re-export of the command runner.
///
/// See [`Interpreter`] for the high-level API and examples.
pub use interpreter::Interpreter;
