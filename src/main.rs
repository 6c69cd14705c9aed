//! srcpin CLI entry point.

use std::io::Write;
use std::process::ExitCode;

use clap::Parser;
use srcpin::cli::{Cli, CommandDispatcher};
use srcpin::config::load_config;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the tracing subscriber for logging.
///
/// Log level is controlled by:
/// 1. `--debug` flag sets level to DEBUG
/// 2. `RUST_LOG` environment variable (if set)
/// 3. Default is INFO
///
/// Logs go to stderr; stdout carries the JSON reports.
fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new("srcpin=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("srcpin=info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    tracing::debug!("srcpin starting with args: {:?}", cli);

    let working_dir = std::env::current_dir().unwrap_or_default();

    let config = match load_config(&working_dir, cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(1);
        }
    };

    let dispatcher = CommandDispatcher::new(working_dir, config);
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    let result = dispatcher.dispatch(&cli, &mut out);
    let _ = out.flush();

    match result {
        Ok(result) => ExitCode::from(result.exit_code as u8),
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(1)
        }
    }
}
