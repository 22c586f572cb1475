//! rowtrace CLI.

use std::io::{self, IsTerminal};

use clap::{ColorChoice, Parser};
use rowtrace_cli::commands::{run_pipeline, run_steps};
use rowtrace_cli::config::PipelineConfig;
use rowtrace_cli::logging::{LogConfig, LogFormat, init_logging};
use rowtrace_cli::report::RunReport;
use rowtrace_cli::summary::print_report;
use tracing::level_filters::LevelFilter;

mod cli;

use crate::cli::{Cli, Command, LogFormatArg, LogLevelArg, ReportFormatArg, RunArgs};

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }
    let exit_code = match &cli.command {
        Command::Run(args) => match run(args) {
            Ok(report) => {
                if let Err(error) = print(&report, args) {
                    eprintln!("error: {error}");
                    1
                } else if report.failure.is_some() {
                    1
                } else {
                    0
                }
            }
            Err(error) => {
                eprintln!("error: {error:#}");
                1
            }
        },
        Command::Steps => {
            run_steps();
            0
        }
    };
    std::process::exit(exit_code);
}

fn run(args: &RunArgs) -> anyhow::Result<RunReport> {
    let mut config = PipelineConfig::from_path(&args.config)?;
    if let Some(column) = &args.id_column {
        config.id_column = Some(column.clone());
    }
    run_pipeline(&args.input, &config, args.output.as_deref())
}

fn print(report: &RunReport, args: &RunArgs) -> serde_json::Result<()> {
    match args.report {
        ReportFormatArg::Table => print_report(report, args.lineage_rows),
        ReportFormatArg::Json => println!("{}", report.to_json()?),
    }
    Ok(())
}

/// Build logging configuration from CLI flags with consistent precedence.
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let mut config = LogConfig {
        level_filter: cli.verbosity.tracing_level_filter(),
        ..LogConfig::default()
    };
    config.use_env_filter = !(cli.verbosity.is_present() || cli.log_level.is_some());
    if let Some(level) = cli.log_level {
        config.level_filter = match level {
            LogLevelArg::Error => LevelFilter::ERROR,
            LogLevelArg::Warn => LevelFilter::WARN,
            LogLevelArg::Info => LevelFilter::INFO,
            LogLevelArg::Debug => LevelFilter::DEBUG,
            LogLevelArg::Trace => LevelFilter::TRACE,
        };
    }
    config.format = match cli.log_format {
        LogFormatArg::Pretty => LogFormat::Pretty,
        LogFormatArg::Compact => LogFormat::Compact,
        LogFormatArg::Json => LogFormat::Json,
    };
    config.log_file = cli.log_file.clone();
    config.with_ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
    };
    config
}
