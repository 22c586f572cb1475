use std::collections::HashSet;

use polars::prelude::{DataFrame, Expr, IntoLazy};
use rowtrace_model::RowId;

use crate::error::Result;
use crate::identity::row_ids;
use crate::transformation::{DatasetTransformation, StepContext};

/// Keeps rows matching a predicate; rows where it is false or null are
/// dropped and recorded in the removal log.
#[derive(Debug, Clone)]
pub struct FilterRows {
    name: String,
    predicate: Expr,
    reason: String,
}

impl FilterRows {
    pub fn new(name: impl Into<String>, predicate: Expr) -> Self {
        let name = name.into();
        Self {
            reason: name.clone(),
            name,
            predicate,
        }
    }

    /// Removal reason recorded for dropped rows (defaults to the step name).
    #[must_use]
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = reason.into();
        self
    }
}

impl DatasetTransformation for FilterRows {
    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&self, df: DataFrame, ctx: &StepContext<'_>) -> Result<DataFrame> {
        let before = row_ids(&df)?;
        let kept = df.lazy().filter(self.predicate.clone()).collect()?;

        let kept_ids: HashSet<RowId> = row_ids(&kept)?.into_iter().collect();
        let removed: Vec<RowId> = before
            .into_iter()
            .filter(|id| !kept_ids.contains(id))
            .collect();
        ctx.ledger()
            .log_removed_rows(&removed, ctx.transformation(), &self.reason);
        Ok(kept)
    }
}
