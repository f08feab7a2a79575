//! Error types for the CLI runtime.

use std::io;
use std::process::ExitCode;

use camino::Utf8PathBuf;
use ownport_engine::EngineError;
use ownport_syntax::SyntaxError;
use thiserror::Error;

use crate::telemetry::TelemetryError;

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error("{0}")]
    CliUsage(clap::Error),
    #[error("failed to read configuration {path}: {source}")]
    ReadConfig { path: Utf8PathBuf, source: io::Error },
    #[error("failed to parse configuration {path}: {source}")]
    ParseConfig {
        path: Utf8PathBuf,
        source: serde_json::Error,
    },
    #[error("the output suffix must not be empty")]
    EmptySuffix,
    #[error(transparent)]
    Telemetry(#[from] TelemetryError),
    #[error("failed to read {path}: {source}")]
    ReadInput { path: Utf8PathBuf, source: io::Error },
    #[error("failed to read syntax tree {path}: {source}")]
    ReadTree { path: Utf8PathBuf, source: io::Error },
    #[error("{path}: {source}")]
    Syntax {
        path: Utf8PathBuf,
        source: SyntaxError,
    },
    #[error("{path}: {source}")]
    Migrate {
        path: Utf8PathBuf,
        source: EngineError,
    },
    #[error("failed to write {path}: {source}")]
    WriteOutput { path: Utf8PathBuf, source: io::Error },
    #[error("failed to report result: {0}")]
    Report(io::Error),
}

impl AppError {
    /// Maps the error onto the process exit status.
    ///
    /// Usage errors exit with 2, matching `clap`; everything else with 1.
    pub(crate) fn exit_code(&self) -> ExitCode {
        match self {
            Self::CliUsage(_) | Self::EmptySuffix => ExitCode::from(2),
            _ => ExitCode::FAILURE,
        }
    }
}
