//! CLI entrypoint for the `ownport` pointer migration tool.
//!
//! The binary delegates to [`ownport_cli::run`], which resolves
//! configuration, migrates the input file and writes the result next to
//! it.

use std::io::{self, StderrLock, StdoutLock};
use std::process::ExitCode;

fn main() -> ExitCode {
    let mut stdout: StdoutLock<'_> = io::stdout().lock();
    let mut stderr: StderrLock<'_> = io::stderr().lock();
    ownport_cli::run(std::env::args_os(), &mut stdout, &mut stderr)
}
