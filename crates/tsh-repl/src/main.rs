//! tsh CLI entry point.
//!
//! Usage:
//!   tsh                 # Interactive shell
//!   tsh -c <command>    # Execute one command line and exit

use std::env;
use std::process::ExitCode;

use anyhow::{Context, Result};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() -> ExitCode {
    // Initialize tracing (respects RUST_LOG env var)
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:?}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<ExitCode> {
    let args: Vec<String> = env::args().collect();

    match args.get(1).map(|s| s.as_str()) {
        None => {
            let code = tsh_repl::run()?;
            Ok(exit_code(code))
        }

        Some("--help" | "-h") => {
            print_help();
            Ok(ExitCode::SUCCESS)
        }

        Some("--version" | "-V") => {
            println!(
                "tsh {} ({} {})",
                env!("CARGO_PKG_VERSION"),
                env!("TSH_GIT_HASH"),
                env!("TSH_BUILD_DATE")
            );
            Ok(ExitCode::SUCCESS)
        }

        Some("-c") => {
            let line = args.get(2).context("-c requires a command argument")?;
            let code = tsh_repl::run_command(line)?;
            Ok(exit_code(code))
        }

        Some(unknown) => {
            eprintln!("Unknown option: {unknown}");
            eprintln!("Run 'tsh --help' for usage.");
            Ok(ExitCode::from(2))
        }
    }
}

/// Shell status to process exit status (low 8 bits, like `exit`).
fn exit_code(code: i64) -> ExitCode {
    ExitCode::from((code & 0xff) as u8)
}

fn print_help() {
    println!(
        r#"tsh v{}

Usage:
  tsh                          Interactive shell
  tsh -c <command>             Execute one command line and exit

Options:
  -c <command>                 Execute command line and exit
  -h, --help                   Show this help
  -V, --version                Show version

Environment:
  PATH                         Program search path
  HOME                         Target of a bare `cd`
  RUST_LOG                     Log filter, e.g. RUST_LOG=tsh_kernel=debug

Examples:
  tsh -c 'sleep 1'             # Run a program in the foreground
  tsh -c 'sort < in > out'     # With redirects
"#,
        env!("CARGO_PKG_VERSION")
    );
}
