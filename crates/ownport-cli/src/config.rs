//! Layered configuration: defaults, then the JSON file, then CLI flags.

use std::fs;

use camino::{Utf8Path, Utf8PathBuf};
use ownport_engine::RewriteOptions;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::cli::Cli;
use crate::errors::AppError;

/// Suffix appended to the input path when none is configured.
pub(crate) const DEFAULT_SUFFIX: &str = ".tmp";

/// Log filter used when none is configured.
pub(crate) const DEFAULT_LOG_FILTER: &str = "warn";

/// Supported logging output formats.
#[derive(
    Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq, EnumString, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum LogFormat {
    /// Structured JSON suitable for ingestion by logging stacks.
    Json,
    /// Human-readable single line output.
    #[default]
    Compact,
}

/// Contents of the optional `--config` file. Every key may be omitted.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigFile {
    suffix: Option<String>,
    log_filter: Option<String>,
    log_format: Option<LogFormat>,
    lenient: Option<bool>,
    rewrite: RewriteOptions,
}

impl ConfigFile {
    fn load(path: &Utf8Path) -> Result<Self, AppError> {
        let text = fs::read_to_string(path).map_err(|source| AppError::ReadConfig {
            path: path.to_owned(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| AppError::ParseConfig {
            path: path.to_owned(),
            source,
        })
    }
}

/// Fully resolved settings for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Settings {
    pub(crate) input: Utf8PathBuf,
    pub(crate) output: Utf8PathBuf,
    pub(crate) tree: Option<Utf8PathBuf>,
    pub(crate) lenient: bool,
    pub(crate) log_filter: String,
    pub(crate) log_format: LogFormat,
    pub(crate) rewrite: RewriteOptions,
}

impl Settings {
    /// Merges the parsed flags over the config file, if any, and defaults.
    pub(crate) fn resolve(cli: Cli) -> Result<Self, AppError> {
        let file = match cli.config.as_deref() {
            Some(path) => ConfigFile::load(path)?,
            None => ConfigFile::default(),
        };

        let suffix = cli
            .suffix
            .or(file.suffix)
            .unwrap_or_else(|| DEFAULT_SUFFIX.to_owned());
        if suffix.is_empty() {
            return Err(AppError::EmptySuffix);
        }

        Ok(Self {
            output: Utf8PathBuf::from(format!("{}{suffix}", cli.input)),
            input: cli.input,
            tree: cli.tree,
            lenient: cli.lenient || file.lenient.unwrap_or(false),
            log_filter: cli
                .log_filter
                .or(file.log_filter)
                .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_owned()),
            log_format: cli.log_format.or(file.log_format).unwrap_or_default(),
            rewrite: file.rewrite,
        })
    }
}
