//! Splitting of a single input line into an argument vector.
//!
//! The grammar is deliberately tiny: tokens are maximal runs of non-space
//! characters, and a token consisting of a lone `&` ends the line and marks the
//! invocation for background execution. There is no quoting, escaping or
//! expansion of any kind.

/// Number of argument slots available to a single invocation, command name included.
pub const DEFAULT_MAX_ARGS: usize = 16;

const SEPARATOR: char = ' ';
const BACKGROUND: &str = "&";

/// Result of tokenizing one input line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Invocation {
    /// `argv[0]` is the command name or path, the rest are its arguments.
    pub argv: Vec<String>,
    /// Set when a lone `&` token was seen.
    pub background: bool,
}

impl Invocation {
    /// Command name, if the line contained any token at all.
    pub fn name(&self) -> Option<&str> {
        self.argv.first().map(String::as_str)
    }

    /// Arguments following the command name.
    pub fn args(&self) -> &[String] {
        self.argv.get(1..).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.argv.is_empty()
    }
}

/// Tokenize `line` into at most `max_args` arguments.
///
/// Runs of spaces are collapsed. Scanning stops at the first lone `&` token
/// (setting [`Invocation::background`]) or once `max_args` tokens have been
/// collected; whatever follows is ignored without error.
pub fn parse(line: &str, max_args: usize) -> Invocation {
    let mut invocation = Invocation::default();

    for token in line.split(SEPARATOR).filter(|t| !t.is_empty()) {
        if invocation.argv.len() >= max_args {
            break;
        }
        if token == BACKGROUND {
            invocation.background = true;
            break;
        }
        invocation.argv.push(token.to_string());
    }

    invocation
}
