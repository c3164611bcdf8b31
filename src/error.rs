use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Failures detected by the dispatcher itself, as opposed to failures
/// reported by a built-in or an external program.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("{name}: not enough arguments ({required} required)")]
    NotEnoughArguments { name: String, required: usize },

    #[error("forkexec `{name}' failed: {source}")]
    Launch {
        name: String,
        #[source]
        source: io::Error,
    },

    /// A file installed by `stdio` could not be opened for a launch.
    #[error("stdio: can't open `{}': {source}", path.display())]
    Redirect {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
