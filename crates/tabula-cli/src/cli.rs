//! CLI argument definitions for the record browser.

use std::num::NonZeroUsize;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;
use tabula_model::{FilterEntry, ViewKind};
use tabula_report::ExportFormat;

#[derive(Parser)]
#[command(
    name = "tabula",
    version,
    about = "Browse, update and export record collections",
    long_about = "Browse a record collection page by page with search, filters and sorting,\n\
                  update single fields with rollback on failure, and export the full\n\
                  filtered view as an Excel workbook or a paged PDF."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Configuration file (default: ./tabula.toml when present).
    #[arg(long = "config", value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Allow record values and search terms in log output.
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Show one page of a collection.
    Browse(BrowseArgs),

    /// Export the whole searched, filtered and sorted view.
    Export(ExportArgs),

    /// Update one field of one record.
    SetField(SetFieldArgs),

    /// List the built-in views.
    Views,
}

/// Which collection file to read and how to query it.
#[derive(Args)]
pub struct QueryArgs {
    /// JSON file holding the collection (array or `{"data": [...]}`).
    #[arg(value_name = "FILE")]
    pub source: PathBuf,

    /// View preset: jobs, applications or inquiries.
    #[arg(long = "view", value_name = "VIEW")]
    pub view: ViewKind,

    /// Case-insensitive substring matched against the view's search fields.
    #[arg(long = "search", value_name = "TERM")]
    pub search: Option<String>,

    /// Equality filter, repeatable. An empty value clears the filter.
    #[arg(long = "filter", value_name = "FIELD=VALUE")]
    pub filters: Vec<FilterEntry>,

    /// Sort field, alias (e.g. `date`) or column label (default: the view's
    /// default sort).
    #[arg(long = "sort", value_name = "FIELD")]
    pub sort: Option<String>,

    /// Sort descending instead of ascending.
    #[arg(long = "desc", requires = "sort")]
    pub descending: bool,
}

#[derive(Args)]
pub struct BrowseArgs {
    #[command(flatten)]
    pub query: QueryArgs,

    /// Page to show (clamped to the available pages).
    #[arg(long = "page", default_value_t = 1)]
    pub page: usize,

    /// Rows per page (overrides the config file).
    #[arg(long = "page-size", value_name = "N")]
    pub page_size: Option<NonZeroUsize>,

    /// Also print record counts by status.
    #[arg(long = "summary")]
    pub summary: bool,
}

#[derive(Args)]
pub struct ExportArgs {
    #[command(flatten)]
    pub query: QueryArgs,

    /// Output format to generate.
    #[arg(long = "format", value_enum, default_value = "both")]
    pub format: ExportFormatArg,

    /// Output directory (overrides the config file).
    #[arg(long = "out", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Rows per document page (overrides the config file).
    #[arg(long = "rows-per-page", value_name = "N")]
    pub rows_per_page: Option<NonZeroUsize>,
}

#[derive(Args)]
pub struct SetFieldArgs {
    /// JSON file holding the collection; the update is written back to it.
    #[arg(value_name = "FILE")]
    pub source: PathBuf,

    /// View preset the collection belongs to.
    #[arg(long = "view", value_name = "VIEW")]
    pub view: ViewKind,

    /// Record id.
    #[arg(long = "id", value_name = "ID")]
    pub id: String,

    /// Field to change, e.g. `status`.
    #[arg(value_name = "FIELD")]
    pub field: String,

    /// New value, converted using the view's schema.
    #[arg(value_name = "VALUE")]
    pub value: String,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum ExportFormatArg {
    Spreadsheet,
    Document,
    Both,
}

impl ExportFormatArg {
    pub fn formats(self) -> Vec<ExportFormat> {
        match self {
            ExportFormatArg::Spreadsheet => vec![ExportFormat::Spreadsheet],
            ExportFormatArg::Document => vec![ExportFormat::Document],
            ExportFormatArg::Both => ExportFormat::ALL.to_vec(),
        }
    }
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
