//! `rowtrace run` and `rowtrace steps`.

use std::fs::File;
use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use polars::prelude::{
    CsvReadOptions, CsvWriter, DataFrame, DataType, NamedFrom, PolarsResult, SerReader, SerWriter,
    Series,
};
use tracing::{info, info_span};

use rowtrace_core::MetadataLedger;
use rowtrace_core::frame::any_to_value;

use crate::config::PipelineConfig;
use crate::report::RunReport;
use crate::summary::steps_help_table;

pub fn run_steps() {
    println!("{}", steps_help_table());
}

/// Run `config` over the CSV at `input`.
///
/// A failing step does not make this function fail: the failure is carried
/// in the returned report next to whatever the ledger recorded before it.
///
/// # Errors
///
/// Returns an error when the input cannot be read, the config cannot be
/// turned into a pipeline, or the output cannot be written.
pub fn run_pipeline(
    input: &Path,
    config: &PipelineConfig,
    output: Option<&Path>,
) -> Result<RunReport> {
    let span = info_span!("run", input = %input.display(), steps = config.steps.len());
    let _guard = span.enter();

    let df = read_csv(input)?;
    let mut pipeline = config.build(MetadataLedger::new())?;

    let start = Instant::now();
    let outcome = pipeline.run(&df);
    info!(
        state = pipeline.state().as_str(),
        duration_ms = start.elapsed().as_millis(),
        "run finished"
    );

    match outcome {
        Ok(result) => {
            if let Some(path) = output {
                write_csv(&result, path)?;
                info!(path = %path.display(), rows = result.height(), "output written");
            }
            Ok(RunReport::collect(
                &pipeline,
                df.height(),
                Some(result.height()),
                None,
            ))
        }
        Err(error) => Ok(RunReport::collect(
            &pipeline,
            df.height(),
            None,
            Some(error.to_string()),
        )),
    }
}

pub fn read_csv(path: &Path) -> Result<DataFrame> {
    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(100))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .with_context(|| format!("open {}", path.display()))?
        .finish()
        .with_context(|| format!("parse {}", path.display()))
}

/// Write `df` as CSV; list columns are written in their display form.
pub fn write_csv(df: &DataFrame, path: &Path) -> Result<()> {
    let mut flat = flatten_lists(df).context("flatten list columns")?;
    let mut file =
        File::create(path).with_context(|| format!("create {}", path.display()))?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .finish(&mut flat)
        .with_context(|| format!("write {}", path.display()))
}

fn flatten_lists(df: &DataFrame) -> PolarsResult<DataFrame> {
    let mut out = df.clone();
    for column in df.get_columns() {
        if !matches!(column.dtype(), DataType::List(_) | DataType::Array(..)) {
            continue;
        }
        let values = (0..column.len())
            .map(|idx| {
                let value = any_to_value(column.get(idx)?);
                Ok((!value.is_null()).then(|| value.to_string()))
            })
            .collect::<PolarsResult<Vec<Option<String>>>>()?;
        out.with_column(Series::new(column.name().clone(), values))?;
    }
    Ok(out)
}
