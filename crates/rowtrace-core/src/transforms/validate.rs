use polars::prelude::DataFrame;
use rowtrace_model::{Row, Value};
use rowtrace_validate::Validator;

use crate::error::Result;
use crate::frame::rows;
use crate::transformation::{DatasetTransformation, StepContext};

/// Validates every row and leaves the dataset unchanged.
///
/// A validation failure is never isolated to its row: the first failing row
/// fails the whole step.
#[derive(Debug)]
pub struct ValidateRows {
    validator: Validator,
}

impl ValidateRows {
    pub fn new(validator: Validator) -> Self {
        Self { validator }
    }
}

impl DatasetTransformation for ValidateRows {
    fn name(&self) -> &str {
        "validate_rows"
    }

    fn apply(&self, df: DataFrame, ctx: &StepContext<'_>) -> Result<DataFrame> {
        let check = ctx.fault_tolerant("validate_row", |row: &Row| {
            self.validator.validate(row)?;
            Ok(Value::Bool(true))
        });
        for row in rows(&df)? {
            check.call(&row)?;
        }
        Ok(df)
    }
}
