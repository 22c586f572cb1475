//! The dataset-level and row-level function contracts.

use polars::prelude::DataFrame;
use rowtrace_model::{Row, Value};

use crate::error::{Result, RowError};
use crate::instrument::FaultTolerant;
use crate::ledger::MetadataLedger;

/// What a transformation sees besides its input dataset.
#[derive(Debug, Clone, Copy)]
pub struct StepContext<'a> {
    ledger: &'a MetadataLedger,
    transformation: &'a str,
}

impl<'a> StepContext<'a> {
    pub fn new(ledger: &'a MetadataLedger, transformation: &'a str) -> Self {
        Self {
            ledger,
            transformation,
        }
    }

    pub fn ledger(&self) -> &'a MetadataLedger {
        self.ledger
    }

    /// Name of the step currently executing.
    pub fn transformation(&self) -> &'a str {
        self.transformation
    }

    /// Wrap a row function with fault isolation bound to this run's ledger.
    pub fn fault_tolerant<F>(&self, name: impl Into<String>, func: F) -> FaultTolerant<F>
    where
        F: Fn(&Row) -> std::result::Result<Value, RowError>,
    {
        FaultTolerant::new(name, func, self.ledger.clone())
    }
}

/// A whole-dataset transformation: `(dataset, bound configuration) -> dataset`.
///
/// Configuration is captured when the value is constructed; `apply` receives
/// only the dataset and the step context.
pub trait DatasetTransformation {
    /// Name recorded in lineage, logs, and error records.
    fn name(&self) -> &str;

    /// Produce the next dataset. The input is owned; implementations return
    /// a new frame rather than reaching back into the caller's copy.
    fn apply(&self, df: DataFrame, ctx: &StepContext<'_>) -> Result<DataFrame>;
}

impl<T: DatasetTransformation + ?Sized> DatasetTransformation for Box<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn apply(&self, df: DataFrame, ctx: &StepContext<'_>) -> Result<DataFrame> {
        (**self).apply(df, ctx)
    }
}

/// A named closure used as a dataset transformation.
pub struct FnTransformation<F> {
    name: String,
    func: F,
}

impl<F> FnTransformation<F>
where
    F: Fn(DataFrame, &StepContext<'_>) -> Result<DataFrame>,
{
    pub fn new(name: impl Into<String>, func: F) -> Self {
        Self {
            name: name.into(),
            func,
        }
    }
}

impl<F> DatasetTransformation for FnTransformation<F>
where
    F: Fn(DataFrame, &StepContext<'_>) -> Result<DataFrame>,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&self, df: DataFrame, ctx: &StepContext<'_>) -> Result<DataFrame> {
        (self.func)(df, ctx)
    }
}

/// A function computing one derived value from one row.
pub trait RowFunction {
    fn call(&self, row: &Row) -> std::result::Result<Value, RowError>;
}

impl<F> RowFunction for F
where
    F: Fn(&Row) -> std::result::Result<Value, RowError>,
{
    fn call(&self, row: &Row) -> std::result::Result<Value, RowError> {
        self(row)
    }
}
