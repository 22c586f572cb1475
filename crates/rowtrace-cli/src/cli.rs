//! CLI argument definitions for `rowtrace`.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "rowtrace",
    version,
    about = "Run a tabular pipeline and report row lineage, errors, and timings",
    long_about = "Run a sequence of transformations over a CSV dataset.\n\n\
                  Every row is given an identifier before the first step. The run\n\
                  reports which steps touched each row, which rows failed and why,\n\
                  how long each step took, and which rows were filtered out."
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
}

#[derive(Subcommand)]
pub enum Command {
    /// Run a pipeline config over a CSV file.
    Run(RunArgs),

    /// List the step kinds a pipeline config may use.
    Steps,
}

#[derive(Parser)]
pub struct RunArgs {
    /// Input CSV file with a header row.
    #[arg(value_name = "CSV")]
    pub input: PathBuf,

    /// Pipeline config (JSON).
    #[arg(long = "config", value_name = "JSON")]
    pub config: PathBuf,

    /// Write the resulting dataset to this CSV file.
    #[arg(long = "output", value_name = "CSV")]
    pub output: Option<PathBuf>,

    /// How the run report is printed.
    #[arg(long = "report", value_enum, default_value = "table")]
    pub report: ReportFormatArg,

    /// Reuse this column as row identifiers when its values are unique.
    ///
    /// Overrides `id_column` from the config file.
    #[arg(long = "id-column", value_name = "COL")]
    pub id_column: Option<String>,

    /// Maximum number of rows shown in the lineage table.
    #[arg(long = "lineage-rows", value_name = "N", default_value_t = 20)]
    pub lineage_rows: usize,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum ReportFormatArg {
    Table,
    Json,
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
