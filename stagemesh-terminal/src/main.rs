//! stagemesh Terminal Demo - Stage Report
//!
//! Loads OBJ files, merges every model into one stage and prints the models,
//! parse warnings and merged buffer sizes.
//!
//! Usage: stagemesh-terminal <file.obj>...
//! Set `RUST_LOG=debug` for per-model parse logging.

use std::env;
use std::io::{self, stdout};
use std::path::PathBuf;
use std::process::ExitCode;
use stagemesh_terminal::TerminalApp;

fn main() -> io::Result<ExitCode> {
    // Warnings are part of the report itself, so only errors are logged by default
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("error")).init();

    let paths: Vec<PathBuf> = env::args_os().skip(1).map(PathBuf::from).collect();
    if paths.is_empty() {
        eprintln!("Usage: stagemesh-terminal <file.obj>...");
        return Ok(ExitCode::from(2));
    }

    let app = TerminalApp::load(&paths);
    app.run(&mut stdout())?;

    Ok(if app.has_failures() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}
