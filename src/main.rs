use std::io::{self, Write};

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use bundlequill::cli::{run, Cli};

/// Installs the stderr log subscriber.
///
/// `RUST_LOG` wins when set; otherwise `-v` flags raise the level from `warn`.
fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    run(cli, &mut out)?;
    out.flush()?;
    Ok(())
}
