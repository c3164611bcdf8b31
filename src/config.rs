use crate::launcher::DEFAULT_SEARCH_DIR;
use crate::tokenizer::DEFAULT_MAX_ARGS;
use argh::FromArgs;
use std::path::PathBuf;

#[derive(FromArgs, Debug)]
/// System command shell interpreter.
pub struct Args {
    #[argh(option, short = 'p', long = "path")]
    /// directory searched for programs that are not found as given; repeatable, defaults to /bin.
    pub search_path: Vec<PathBuf>,

    #[argh(option, short = 'm', default = "DEFAULT_MAX_ARGS")]
    /// maximum number of words per command line, command name included.
    pub max_args: usize,

    #[argh(positional)]
    /// file(s) containing shell commands to execute.
    pub files: Vec<PathBuf>,
}

/// Settings that stay fixed for the lifetime of an interpreter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Fallback directories, tried in order after the direct path.
    pub search_path: Vec<PathBuf>,
    /// Argument slots per line; extra words are dropped.
    pub max_args: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            search_path: vec![PathBuf::from(DEFAULT_SEARCH_DIR)],
            max_args: DEFAULT_MAX_ARGS,
        }
    }
}

impl From<&Args> for Config {
    fn from(args: &Args) -> Self {
        let defaults = Config::default();
        Self {
            search_path: if args.search_path.is_empty() {
                defaults.search_path
            } else {
                args.search_path.clone()
            },
            max_args: args.max_args.max(1),
        }
    }
}
