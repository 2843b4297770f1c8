//! CLI binary for `taskdeck`.
//!
//! This binary is a thin wrapper that reads stdin and delegates to the library.

use std::io::{self, Read};
use std::process::ExitCode;

use clap::Parser;
use taskdeck::cli::{run, Cli};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() -> ExitCode {
    // Logs go to stderr; stdout carries command output only.
    let filter = std::env::var("TASKDECK_LOG")
        .ok()
        .and_then(|raw| EnvFilter::try_new(raw.trim()).ok())
        .unwrap_or_else(|| EnvFilter::new("warn"));

    tracing_subscriber::registry().with(fmt::layer().with_writer(io::stderr)).with(filter).init();

    let cli = Cli::parse();

    // Only read stdin when no snapshot file was given (avoids blocking on terminal)
    let stdin = if cli.needs_stdin() { read_stdin() } else { String::new() };

    let output = run(cli, &stdin);

    for line in output.stdout {
        println!("{line}");
    }
    for line in output.stderr {
        eprintln!("{line}");
    }

    output.exit_code
}

fn read_stdin() -> String {
    let mut input = String::new();
    if let Err(e) = io::stdin().read_to_string(&mut input) {
        tracing::error!(error = %e, "failed to read stdin");
    }
    input
}
