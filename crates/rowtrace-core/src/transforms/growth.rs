use polars::prelude::DataFrame;
use rowtrace_model::{Row, Value};

use crate::error::{Result, RowError};
use crate::transformation::{DatasetTransformation, StepContext};

/// `(end - start) / start` for one row.
///
/// # Errors
///
/// Fails when either field is missing or non-numeric, or when `start` is not
/// strictly positive.
pub fn growth_rate(
    row: &Row,
    start_column: &str,
    end_column: &str,
) -> std::result::Result<Value, RowError> {
    let start = row.require_f64(start_column)?;
    let end = row.require_f64(end_column)?;
    if start <= 0.0 {
        return Err(RowError::invalid(start_column, "must be greater than 0"));
    }
    Ok(Value::Float((end - start) / start))
}

/// Adds a growth-rate column computed row by row.
///
/// Rows whose growth cannot be computed receive the fallback value and an
/// error record; the step itself keeps going.
#[derive(Debug, Clone)]
pub struct GrowthRate {
    start_column: String,
    end_column: String,
    target_column: String,
    fallback: Value,
}

impl GrowthRate {
    pub fn new(target_column: impl Into<String>) -> Self {
        Self {
            start_column: "start_value".to_string(),
            end_column: "end_value".to_string(),
            target_column: target_column.into(),
            fallback: Value::Null,
        }
    }

    #[must_use]
    pub fn with_columns(mut self, start: impl Into<String>, end: impl Into<String>) -> Self {
        self.start_column = start.into();
        self.end_column = end.into();
        self
    }

    #[must_use]
    pub fn with_fallback(mut self, fallback: impl Into<Value>) -> Self {
        self.fallback = fallback.into();
        self
    }

    pub fn target_column(&self) -> &str {
        &self.target_column
    }
}

impl DatasetTransformation for GrowthRate {
    fn name(&self) -> &str {
        "calculate_growth_rate"
    }

    fn apply(&self, df: DataFrame, ctx: &StepContext<'_>) -> Result<DataFrame> {
        let calculate = ctx
            .fault_tolerant("calculate_growth", |row: &Row| {
                growth_rate(row, &self.start_column, &self.end_column)
            })
            .column(self.target_column.as_str())
            .fallback(self.fallback.clone());
        calculate.apply_to_column(df, &self.target_column)
    }
}
