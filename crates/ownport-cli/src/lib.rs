//! Command-line front end for the `ownport` pointer migration.
//!
//! [`run`] parses arguments, layers configuration, installs telemetry,
//! builds a syntax tree for the input (by parsing it, or by loading a JSON
//! tree with `--tree`), migrates it and writes `<INPUT><SUFFIX>` when
//! anything changed.
//!
//! On success the runner prints `Src file changed.` on stdout, or
//! `No changes.` on stderr when no edit applied. Every failure is written
//! to stderr and mapped to a non-zero exit code.

mod cli;
mod config;
mod emit;
mod errors;
mod telemetry;

use std::ffi::OsString;
use std::fs;
use std::io::Write;
use std::process::ExitCode;

use clap::Parser;
use ownport_engine::{Migration, Migrator};
use ownport_syntax::{
    CppProvider, JsonProvider, SyntaxNode, SyntaxProvider, offset_to_one_based,
};
use tracing::{info, warn};

use crate::cli::Cli;
use crate::config::Settings;
use crate::errors::AppError;

pub use config::LogFormat;

/// Runs the CLI using the provided arguments and IO handles.
#[must_use]
pub fn run<I, W, E>(args: I, stdout: &mut W, stderr: &mut E) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
{
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(error) if !error.use_stderr() => {
            let _ = write!(stdout, "{error}");
            return ExitCode::SUCCESS;
        }
        Err(error) => {
            let error = AppError::CliUsage(error);
            let _ = write!(stderr, "{error}");
            return error.exit_code();
        }
    };

    match execute(cli, stdout, stderr) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            let _ = writeln!(stderr, "{error}");
            error.exit_code()
        }
    }
}

fn execute<W, E>(cli: Cli, stdout: &mut W, stderr: &mut E) -> Result<(), AppError>
where
    W: Write,
    E: Write,
{
    let settings = Settings::resolve(cli)?;
    telemetry::initialise(&settings.log_filter, settings.log_format)?;

    let source = fs::read(&settings.input).map_err(|source| AppError::ReadInput {
        path: settings.input.clone(),
        source,
    })?;
    let tree = build_tree(&settings, &source)?;
    let migration = Migrator::new(settings.rewrite.clone())
        .migrate(&tree, &source)
        .map_err(|source| AppError::Migrate {
            path: settings.input.clone(),
            source,
        })?;
    log_observations(&settings, &source, &migration);

    if migration.changed() {
        emit::atomic_write(&settings.output, migration.output()).map_err(|source| {
            AppError::WriteOutput {
                path: settings.output.clone(),
                source,
            }
        })?;
        info!(output = %settings.output, edits = migration.applied().len(), "output written");
        writeln!(stdout, "Src file changed.").map_err(AppError::Report)
    } else {
        writeln!(stderr, "No changes.").map_err(AppError::Report)
    }
}

fn build_tree(settings: &Settings, source: &[u8]) -> Result<SyntaxNode, AppError> {
    let syntax_error = |source| AppError::Syntax {
        path: settings.input.clone(),
        source,
    };
    match settings.tree.as_deref() {
        Some(path) => {
            let document = fs::read_to_string(path).map_err(|source| AppError::ReadTree {
                path: path.to_owned(),
                source,
            })?;
            JsonProvider::new(document)
                .provide(source)
                .map_err(syntax_error)
        }
        None => CppProvider::new()
            .map_err(syntax_error)?
            .lenient(settings.lenient)
            .provide(source)
            .map_err(syntax_error),
    }
}

fn log_observations(settings: &Settings, source: &[u8], migration: &Migration) {
    for observation in migration.observations() {
        let (line, column) = offset_to_one_based(source, observation.span().start);
        if observation.is_rejection() {
            warn!(input = %settings.input, line, column, %observation, "edit rejected");
        } else {
            info!(
                input = %settings.input,
                line,
                column,
                %observation,
                "construct left unchanged"
            );
        }
    }
}
