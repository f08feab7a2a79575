//! CLI argument definitions for `ownport`.

use camino::Utf8PathBuf;
use clap::Parser;

use crate::config::LogFormat;

/// Migrates raw owning pointers in one C++ source file to smart pointers.
///
/// The migrated text is written to `<INPUT><SUFFIX>`; the input itself is
/// never modified.
#[derive(Parser, Debug)]
#[command(name = "ownport", version)]
pub(crate) struct Cli {
    /// C++ source file to migrate.
    #[arg(value_name = "INPUT")]
    pub(crate) input: Utf8PathBuf,
    /// Suffix appended to the input path to form the output path.
    #[arg(long, value_name = "SUFFIX")]
    pub(crate) suffix: Option<String>,
    /// Reads a pre-built JSON syntax tree instead of parsing the input.
    #[arg(long, value_name = "JSON")]
    pub(crate) tree: Option<Utf8PathBuf>,
    /// JSON configuration file with rewrite spellings and defaults.
    #[arg(long, value_name = "JSON")]
    pub(crate) config: Option<Utf8PathBuf>,
    /// Migrates what parsed cleanly even when the parser reports errors.
    #[arg(long)]
    pub(crate) lenient: bool,
    /// Log filter directive, for example `ownport_engine=debug`.
    #[arg(long, value_name = "FILTER")]
    pub(crate) log_filter: Option<String>,
    /// Log output format (`json` or `compact`).
    #[arg(long, value_name = "FORMAT")]
    pub(crate) log_format: Option<LogFormat>,
}
