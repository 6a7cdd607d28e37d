#![cfg_attr(not(test), deny(clippy::unwrap_used))]
use std::io::{self, BufRead, Write};

use btfs::config::ShellConfig;
use btfs::shell::{Command, Flow, Shell};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() {
    // Logs go to stderr so they never interleave with command output.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "btfs=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let config = match ShellConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    tracing::info!(
        "Loaded configuration: state_file={}, min_degree={}, autoload={}, autosave={}",
        config.state_file.display(),
        config.min_degree.get(),
        config.autoload,
        config.autosave
    );

    let mut shell = match Shell::open(config) {
        Ok(shell) => shell,
        Err(e) => {
            tracing::error!("Failed to load file system state: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = run(&mut shell) {
        tracing::error!("Shell error: {e}");
        std::process::exit(1);
    }
}

/// Read commands from stdin until `exit` or end of input.
fn run(shell: &mut Shell) -> io::Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut input = stdin.lock();
    let mut line = String::new();

    writeln!(stdout, "Type 'help' for a list of commands.")?;
    loop {
        write!(stdout, "btfs> ")?;
        stdout.flush()?;

        line.clear();
        let at_end = input.read_line(&mut line)? == 0;
        let command = if at_end {
            // End of input behaves like `exit`, autosave included.
            writeln!(stdout)?;
            Command::Exit
        } else {
            match Command::parse(&line) {
                Ok(Some(command)) => command,
                Ok(None) => continue,
                Err(e) => {
                    writeln!(stdout, "error: {e}")?;
                    continue;
                }
            }
        };

        match shell.execute(command, &mut stdout) {
            Ok(Flow::Continue) => {}
            Ok(Flow::Exit) => return Ok(()),
            Err(e) => {
                writeln!(stdout, "error: {e}")?;
                if at_end {
                    return Ok(());
                }
            }
        }
    }
}
