//! Row identity assignment.
//!
//! Every dataset entering a pipeline is stamped with a `row_id` column before
//! any transformation runs. All lineage bookkeeping is keyed on that column.

use std::collections::HashSet;

use polars::prelude::{DataFrame, DataType, NamedFrom, Series};
use rowtrace_model::{GLOBAL_SUBJECT, ROW_ID_COLUMN, RowId};
use tracing::{debug, warn};

use crate::error::{CoreError, Result};

/// How identifiers are obtained for an input dataset.
#[derive(Debug, Clone, Default)]
pub struct IdentityOptions {
    /// Reuse this column's values as identifiers when they are complete and
    /// unique; otherwise mint fresh ones.
    pub reuse_column: Option<String>,
}

impl IdentityOptions {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_reuse_column(mut self, column: impl Into<String>) -> Self {
        self.reuse_column = Some(column.into());
        self
    }
}

/// A `row_id` column of `count` freshly minted identifiers.
pub fn mint_ids(count: usize) -> Series {
    let ids: Vec<String> = (0..count).map(|_| RowId::mint().to_string()).collect();
    Series::new(ROW_ID_COLUMN.into(), ids)
}

/// Return a copy of `df` with freshly minted identifiers, one per row.
pub fn assign_row_ids(df: &DataFrame) -> Result<DataFrame> {
    assign_row_ids_with(df, &IdentityOptions::default())
}

pub fn assign_row_ids_with(df: &DataFrame, options: &IdentityOptions) -> Result<DataFrame> {
    let ids = match options.reuse_column.as_deref() {
        Some(column) => match reusable_ids(df, column)? {
            Some(ids) => ids,
            None => {
                debug!(column, "column is not a unique key, minting row ids");
                mint_ids(df.height())
            }
        },
        None => mint_ids(df.height()),
    };

    let mut out = df.clone();
    if out.get_column_index(ROW_ID_COLUMN).is_some() {
        warn!(
            column = ROW_ID_COLUMN,
            "input already has an identifier column, replacing it"
        );
        out.with_column(ids)?;
    } else {
        out.insert_column(0, ids)?;
    }
    Ok(out)
}

/// Stringified values of `column` when every value is present, non-blank,
/// distinct, and never the global error sentinel.
fn reusable_ids(df: &DataFrame, column: &str) -> Result<Option<Series>> {
    let Ok(source) = df.column(column) else {
        return Ok(None);
    };
    let as_text = source.cast(&DataType::String)?;
    let ca = as_text.str()?;

    let mut seen = HashSet::with_capacity(ca.len());
    let mut ids = Vec::with_capacity(ca.len());
    for value in ca {
        let Some(value) = value
            .map(str::trim)
            .filter(|value| !value.is_empty() && *value != GLOBAL_SUBJECT)
        else {
            return Ok(None);
        };
        if !seen.insert(value) {
            return Ok(None);
        }
        ids.push(value.to_string());
    }
    Ok(Some(Series::new(ROW_ID_COLUMN.into(), ids)))
}

/// Read the identifier column in row order.
pub fn row_ids(df: &DataFrame) -> Result<Vec<RowId>> {
    let column = df
        .column(ROW_ID_COLUMN)
        .map_err(|_| CoreError::MissingRowIdColumn)?;
    let ca = column.str()?;
    ca.into_iter()
        .enumerate()
        .map(|(index, value)| match value {
            Some(value) => Ok(RowId::new(value)?),
            None => Err(CoreError::NullRowId { index }),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DataFrame {
        DataFrame::new(vec![
            Series::new("id".into(), vec![10_i64, 20, 30]).into(),
            Series::new("start_value".into(), vec![100.0, 0.0, 200.0]).into(),
        ])
        .unwrap()
    }

    #[test]
    fn test_assign_row_ids_does_not_mutate_input() {
        let input = sample();
        let out = assign_row_ids(&input).unwrap();
        assert!(input.get_column_index(ROW_ID_COLUMN).is_none());
        assert_eq!(out.get_column_index(ROW_ID_COLUMN), Some(0));
        assert_eq!(out.width(), input.width() + 1);
    }

    #[test]
    fn test_reuse_unique_column() {
        let options = IdentityOptions::new().with_reuse_column("id");
        let out = assign_row_ids_with(&sample(), &options).unwrap();
        let ids: Vec<String> = row_ids(&out)
            .unwrap()
            .into_iter()
            .map(|id| id.to_string())
            .collect();
        assert_eq!(ids, vec!["10", "20", "30"]);
    }

    #[test]
    fn test_reuse_falls_back_on_duplicates() {
        let df = DataFrame::new(vec![Series::new("id".into(), vec!["a", "a"]).into()]).unwrap();
        let options = IdentityOptions::new().with_reuse_column("id");
        let ids = row_ids(&assign_row_ids_with(&df, &options).unwrap()).unwrap();
        assert_ne!(ids[0].as_str(), "a");
        assert_ne!(ids[0], ids[1]);
    }

    #[test]
    fn test_row_ids_requires_column() {
        assert!(matches!(
            row_ids(&sample()),
            Err(CoreError::MissingRowIdColumn)
        ));
    }
}
