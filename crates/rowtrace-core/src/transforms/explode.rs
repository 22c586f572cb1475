use polars::prelude::{DataFrame, DataType, IntoLazy, col, lit};
use rowtrace_model::ROW_ID_COLUMN;

use crate::error::Result;
use crate::identity::mint_ids;
use crate::transformation::{DatasetTransformation, StepContext};

/// Identifier of the row each exploded row came from.
pub const PARENT_ROW_ID_COLUMN: &str = "parent_row_id";

/// Splits each list value of a column into its own row.
///
/// Every output row gets a fresh identifier; the originating identifier moves
/// to `parent_row_id`. A string column can be split on a separator first.
#[derive(Debug, Clone)]
pub struct ExplodeColumn {
    column: String,
    separator: Option<String>,
}

impl ExplodeColumn {
    pub fn new(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            separator: None,
        }
    }

    /// Split string values on `separator` before exploding.
    #[must_use]
    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = Some(separator.into());
        self
    }

    pub fn column(&self) -> &str {
        &self.column
    }
}

impl DatasetTransformation for ExplodeColumn {
    fn name(&self) -> &str {
        "explode_column"
    }

    fn apply(&self, df: DataFrame, _ctx: &StepContext<'_>) -> Result<DataFrame> {
        let is_text = df.column(&self.column)?.dtype() == &DataType::String;
        let mut df = match (&self.separator, is_text) {
            (Some(separator), true) => df
                .lazy()
                .with_column(
                    col(self.column.as_str())
                        .str()
                        .split(lit(separator.as_str()))
                        .alias(self.column.as_str()),
                )
                .collect()?,
            _ => df,
        };

        if df.get_column_index(PARENT_ROW_ID_COLUMN).is_some() {
            df.drop_in_place(PARENT_ROW_ID_COLUMN)?;
        }
        df.rename(ROW_ID_COLUMN, PARENT_ROW_ID_COLUMN.into())?;

        let mut exploded = df.explode([self.column.as_str()])?;
        let ids = mint_ids(exploded.height());
        exploded.insert_column(0, ids)?;
        Ok(exploded)
    }
}
