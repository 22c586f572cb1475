use polars::prelude::DataFrame;
use rowtrace_model::{Row, Subject, Value};
use tracing::debug;

use crate::error::{CoreError, Result, RowError};
use crate::frame::{rows, values_to_series};
use crate::ledger::MetadataLedger;
use crate::transformation::RowFunction;

/// Row-level fault isolation.
///
/// - success: the value passes through unchanged
/// - [`RowError::Validation`]: re-raised with the function name as context
/// - any other failure on an identified row: recorded against that row,
///   replaced by the fallback value
/// - any other failure on an unidentified row: re-raised
pub struct FaultTolerant<F> {
    func: F,
    name: String,
    column: Option<String>,
    fallback: Value,
    ledger: MetadataLedger,
}

impl<F: RowFunction> FaultTolerant<F> {
    pub fn new(name: impl Into<String>, func: F, ledger: MetadataLedger) -> Self {
        Self {
            func,
            name: name.into(),
            column: None,
            fallback: Value::Null,
            ledger,
        }
    }

    /// Target column, used to annotate error records.
    #[must_use]
    pub fn column(mut self, column: impl Into<String>) -> Self {
        self.column = Some(column.into());
        self
    }

    #[must_use]
    pub fn fallback(mut self, fallback: impl Into<Value>) -> Self {
        self.fallback = fallback.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Transformation label written to error records.
    pub fn label(&self) -> String {
        match &self.column {
            Some(column) => format!("{} (column: {column})", self.name),
            None => self.name.clone(),
        }
    }

    pub fn call(&self, row: &Row) -> Result<Value> {
        match self.func.call(row) {
            Ok(value) => Ok(value),
            Err(RowError::Validation(error)) => {
                Err(CoreError::Validation(error.with_context(&self.name)))
            }
            Err(error) => match row.row_id() {
                Some(row_id) => {
                    debug!(
                        row = ?row,
                        function = %self.label(),
                        error = %error,
                        "row function failed on input"
                    );
                    self.ledger
                        .log_error(Subject::Row(row_id.clone()), &self.label(), &error);
                    Ok(self.fallback.clone())
                }
                None => Err(CoreError::Row {
                    function: self.name.clone(),
                    source: error,
                }),
            },
        }
    }

    /// Evaluate every row of `df` and store the results in `column`.
    pub fn apply_to_column(&self, df: DataFrame, column: &str) -> Result<DataFrame> {
        let values = rows(&df)?
            .iter()
            .map(|row| self.call(row))
            .collect::<Result<Vec<_>>>()?;
        let series = values_to_series(column, &values)?;
        let mut df = df;
        df.with_column(series)?;
        Ok(df)
    }
}
