//! tsh REPL — interactive front end for the tsh kernel.
//!
//! This REPL handles:
//! - Line splitting into command descriptors (see [`parse`])
//! - Command execution via the Kernel
//! - Job notices, collected before every prompt
//! - Command history via rustyline
//! - `exit` / `quit`

pub mod parse;

use std::path::PathBuf;

use anyhow::{Context, Result};
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::Editor;
use tokio::runtime::{Builder, Runtime};

use tsh_kernel::{Kernel, KernelConfig};
use tsh_types::ExecResult;

/// What the caller should do after a line.
#[derive(Debug)]
pub enum ProcessResult {
    /// Show this result (if any) and keep reading.
    Continue(Option<ExecResult>),
    /// Leave the REPL.
    Exit,
}

/// REPL configuration and state.
pub struct Repl {
    // dropped before the runtime its signal listeners belong to
    kernel: Kernel,
    runtime: Runtime,
    last_code: i64,
}

impl Repl {
    /// Create an interactive REPL.
    pub fn new() -> Result<Self> {
        Self::with_config(KernelConfig::repl())
    }

    /// Create a REPL with a custom kernel configuration.
    pub fn with_config(config: KernelConfig) -> Result<Self> {
        // single-threaded: signal masks and waitpid stay on the shell thread
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .context("Failed to create tokio runtime")?;

        let kernel = {
            let _enter = runtime.enter();
            Kernel::new(config).context("Failed to create kernel")?
        };

        Ok(Self {
            kernel,
            runtime,
            last_code: 0,
        })
    }

    /// Process a single line of input.
    pub fn process_line(&mut self, line: &str) -> Result<ProcessResult> {
        let trimmed = line.trim();
        if matches!(trimmed, "exit" | "quit") {
            return Ok(ProcessResult::Exit);
        }

        let cmd = match parse::split_line(trimmed) {
            Ok(Some(cmd)) => cmd,
            Ok(None) => return Ok(ProcessResult::Continue(None)),
            Err(e) => {
                self.last_code = 2;
                return Ok(ProcessResult::Continue(Some(ExecResult::failure(
                    2,
                    format!("tsh: {e}\n"),
                ))));
            }
        };

        let mut result = self.runtime.block_on(self.kernel.execute(cmd))?;
        if !result.err.is_empty() && !result.err.ends_with('\n') {
            result.err.push('\n');
        }
        self.last_code = result.code;
        Ok(ProcessResult::Continue(Some(result)))
    }

    /// Collect job notices; called before each prompt.
    pub fn poll(&mut self) -> ExecResult {
        let _enter = self.runtime.enter();
        self.kernel.poll_jobs()
    }

    /// Exit code of the last command.
    pub fn last_code(&self) -> i64 {
        self.last_code
    }

    /// The kernel behind this REPL.
    pub fn kernel(&self) -> &Kernel {
        &self.kernel
    }
}

/// Print a result's streams.
fn emit(result: &ExecResult) {
    if !result.out.is_empty() {
        print!("{}", result.out);
    }
    if !result.err.is_empty() {
        eprint!("{}", result.err);
    }
}

fn history_path() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.data_dir().join("tsh").join("history.txt"))
}

/// Save REPL history to disk.
fn save_history(rl: &mut Editor<(), DefaultHistory>, history_path: &Option<PathBuf>) {
    if let Some(path) = history_path {
        if let Some(parent) = path.parent()
            && let Err(e) = std::fs::create_dir_all(parent)
        {
            tracing::warn!("Failed to create history directory: {}", e);
        }
        if let Err(e) = rl.save_history(path) {
            tracing::warn!("Failed to save history: {}", e);
        }
    }
}

/// Run the interactive REPL. Returns the last command's exit code.
pub fn run() -> Result<i64> {
    let mut rl: Editor<(), DefaultHistory> = Editor::new().context("Failed to create editor")?;

    let history_path = history_path();
    if let Some(ref path) = history_path
        && let Err(e) = rl.load_history(path)
    {
        // Only log if it's not a "file not found" error (expected on first run)
        let is_not_found = matches!(&e, ReadlineError::Io(io_err) if io_err.kind() == std::io::ErrorKind::NotFound);
        if !is_not_found {
            tracing::warn!("Failed to load history: {}", e);
        }
    }

    let mut repl = Repl::new()?;

    loop {
        emit(&repl.poll());

        match rl.readline("tsh> ") {
            Ok(line) => {
                if !line.trim().is_empty()
                    && let Err(e) = rl.add_history_entry(line.as_str())
                {
                    tracing::warn!("Failed to add history entry: {}", e);
                }

                match repl.process_line(&line) {
                    Ok(ProcessResult::Continue(Some(result))) => emit(&result),
                    Ok(ProcessResult::Continue(None)) => {}
                    Ok(ProcessResult::Exit) => break,
                    Err(e) => eprintln!("Error: {e:#}"),
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("^C");
                continue;
            }
            Err(ReadlineError::Eof) => break,
            Err(err) => {
                eprintln!("Error: {}", err);
                break;
            }
        }
    }

    save_history(&mut rl, &history_path);
    Ok(repl.last_code())
}

/// Execute one command line non-interactively. Returns its exit code.
pub fn run_command(line: &str) -> Result<i64> {
    let mut repl = Repl::with_config(KernelConfig::transient())?;

    match repl.process_line(line)? {
        ProcessResult::Continue(Some(result)) => emit(&result),
        ProcessResult::Continue(None) | ProcessResult::Exit => {}
    }
    emit(&repl.poll());
    Ok(repl.last_code())
}
