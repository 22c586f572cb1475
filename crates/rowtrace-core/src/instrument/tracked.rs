use std::collections::HashSet;
use std::time::Instant;

use polars::prelude::DataFrame;
use rowtrace_model::{Details, RowId, Subject};
use tracing::debug;

use crate::error::{CoreError, Result};
use crate::identity::row_ids;
use crate::ledger::MetadataLedger;
use crate::transformation::{DatasetTransformation, StepContext};

/// Input rows echoed to the debug log when a step fails.
const FAILED_INPUT_PREVIEW_ROWS: usize = 5;

/// Dataset-level metadata wrapper.
///
/// On success the ledger gains one lineage entry per output row (keyed by the
/// inner transformation's name) and one transformation log record. On
/// failure it gains exactly one global error record and the error is
/// returned unchanged. An output that repeats a row id is a step failure.
pub struct Tracked<T> {
    inner: T,
    ledger: MetadataLedger,
}

impl<T: DatasetTransformation> Tracked<T> {
    pub fn new(inner: T, ledger: MetadataLedger) -> Self {
        Self { inner, ledger }
    }

    pub fn inner(&self) -> &T {
        &self.inner
    }

    pub fn ledger(&self) -> &MetadataLedger {
        &self.ledger
    }

    /// Run the wrapped transformation with this wrapper's ledger.
    pub fn run(&self, df: DataFrame) -> Result<DataFrame> {
        let name = self.inner.name();
        let start = Instant::now();
        let input_rows = df.height();
        let preview = df.head(Some(FAILED_INPUT_PREVIEW_ROWS));

        match self.execute(name, df) {
            Ok((result, new_row_ids)) => {
                let mut details = Details::new();
                details.insert("row_count".to_string(), result.height().into());
                details.insert("input_rows".to_string(), input_rows.into());
                details.insert("new_row_ids".to_string(), new_row_ids.into());
                self.ledger.log_transformation(name, start, details);
                Ok(result)
            }
            Err(error) => {
                self.ledger.log_error(Subject::Global, name, &error);
                debug!(
                    transformation = name,
                    input_rows,
                    columns = ?preview.get_column_names(),
                    head = %preview,
                    "transformation failed on input"
                );
                Err(error)
            }
        }
    }

    fn execute(&self, name: &str, df: DataFrame) -> Result<(DataFrame, usize)> {
        let input_ids: HashSet<RowId> = row_ids(&df)?.into_iter().collect();
        let ctx = StepContext::new(&self.ledger, name);
        let result = self.inner.apply(df, &ctx)?;

        let output_ids = row_ids(&result)?;
        if let Some(duplicate) = first_duplicate(&output_ids) {
            return Err(CoreError::step(
                name,
                format!("output contains duplicate row id `{duplicate}`"),
            ));
        }
        let new_ids: HashSet<RowId> = output_ids
            .into_iter()
            .filter(|id| !input_ids.contains(id))
            .collect();
        self.ledger.update_lineage(&result, name, &new_ids)?;
        Ok((result, new_ids.len()))
    }
}

fn first_duplicate(ids: &[RowId]) -> Option<&RowId> {
    let mut seen = HashSet::with_capacity(ids.len());
    ids.iter().find(|id| !seen.insert(*id))
}

impl<T: DatasetTransformation> DatasetTransformation for Tracked<T> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn apply(&self, df: DataFrame, _ctx: &StepContext<'_>) -> Result<DataFrame> {
        self.run(df)
    }
}
