use std::io::IsTerminal;
use tinysh::input::{Editor, LineSource, RawTerminal};
use tinysh::{Args, Config, Interpreter};

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args: Args = argh::from_env();
    let mut sh = Interpreter::new(Config::from(&args), tinysh::builtins());

    let code = if !args.files.is_empty() {
        sh.run_batch(args.files.as_slice())
    } else {
        print!("\r\nEntering interactive Shell. Type 'help' for the command list.\r\n\r\n");

        let mut source: Box<dyn LineSource> = if std::io::stdin().is_terminal() {
            Box::new(
                Editor::new().map_err(|e| anyhow::anyhow!("can't set up line editor: {}", e))?,
            )
        } else {
            Box::new(RawTerminal::new(std::io::stdin(), std::io::stdout()))
        };
        sh.run_interactive(source.as_mut())?
    };

    std::process::exit(code)
}
