use std::path::Path;

const WHITE: &str = "\x1b[1;37m";
const GREEN: &str = "\x1b[1;32m";
const BLUE: &str = "\x1b[1;34m";
const RESET: &str = "\x1b[0m";

/// Name of this machine, `localhost` when it can't be determined.
pub fn host_name() -> String {
    nix::unistd::gethostname()
        .ok()
        .and_then(|name| name.into_string().ok())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| "localhost".to_string())
}

/// Render the interactive prompt: `(host) cwd # `.
pub fn render(host: &str, cwd: &Path) -> String {
    format!(
        "{WHITE}({GREEN}{host}{WHITE}) {BLUE}{cwd}{WHITE} # {RESET}",
        cwd = cwd.display()
    )
}
