use polars::prelude::PolarsError;
use rowtrace_model::{FieldError, ModelError, ROW_ID_COLUMN, ValidationError};
use thiserror::Error;

/// Failure raised by a row-level function.
///
/// Everything except [`RowError::Validation`] is recoverable: fault
/// isolation records it against the row and substitutes a fallback value.
#[derive(Debug, Error)]
pub enum RowError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Field(#[from] FieldError),
    #[error("{field} {message}")]
    InvalidValue { field: String, message: String },
    #[error("{0}")]
    Compute(String),
}

impl RowError {
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("polars error: {0}")]
    Polars(#[from] PolarsError),
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("dataset has no `{}` column", ROW_ID_COLUMN)]
    MissingRowIdColumn,
    #[error("null row id at index {index}")]
    NullRowId { index: usize },
    #[error("row function `{function}` failed on a row without an identifier: {source}")]
    Row {
        function: String,
        #[source]
        source: RowError,
    },
    #[error("transformation `{transformation}` failed: {message}")]
    Step {
        transformation: String,
        message: String,
    },
}

impl CoreError {
    pub fn step(transformation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Step {
            transformation: transformation.into(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;
