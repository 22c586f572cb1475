use std::collections::BTreeMap;

use polars::prelude::{DataFrame, Expr, IntoLazy, col, len};
use rowtrace_model::{ROW_ID_COLUMN, Reduction};

use crate::error::{CoreError, Result};
use crate::identity::mint_ids;
use crate::transformation::{DatasetTransformation, StepContext};

/// List of the identifiers that were merged into each output row.
pub const SOURCE_ROW_IDS_COLUMN: &str = "source_row_ids";
/// Number of input rows merged into each output row.
pub const CONTRIBUTION_COUNTS_COLUMN: &str = "contribution_counts";

/// Group-by aggregation that mints a fresh identifier per group.
///
/// Groups keep the order of their first appearance. Ancestry is kept in the
/// `source_row_ids` column, not in the lineage ledger.
#[derive(Debug, Clone)]
pub struct Aggregate {
    group_by: Vec<String>,
    aggregations: BTreeMap<String, Reduction>,
}

impl Aggregate {
    pub fn new<I, S>(group_by: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            group_by: group_by.into_iter().map(Into::into).collect(),
            aggregations: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with(mut self, column: impl Into<String>, reduction: Reduction) -> Self {
        self.aggregations.insert(column.into(), reduction);
        self
    }

    #[must_use]
    pub fn with_aggregations(mut self, aggregations: BTreeMap<String, Reduction>) -> Self {
        self.aggregations.extend(aggregations);
        self
    }

    pub fn group_by(&self) -> &[String] {
        &self.group_by
    }
}

fn reduction_expr(column: &str, reduction: Reduction) -> Expr {
    let expr = col(column);
    match reduction {
        Reduction::Sum => expr.sum(),
        Reduction::Mean => expr.mean(),
        Reduction::Median => expr.median(),
        Reduction::Min => expr.min(),
        Reduction::Max => expr.max(),
        Reduction::Count => expr.count(),
        Reduction::First => expr.first(),
        Reduction::Last => expr.last(),
        Reduction::NUnique => expr.n_unique(),
        // A bare column inside an aggregation collects the group's values.
        Reduction::List => expr,
    }
}

impl DatasetTransformation for Aggregate {
    fn name(&self) -> &str {
        "aggregate_with_details"
    }

    fn apply(&self, df: DataFrame, _ctx: &StepContext<'_>) -> Result<DataFrame> {
        if self.group_by.is_empty() {
            return Err(CoreError::step(
                self.name(),
                "at least one group-by column is required",
            ));
        }

        let keys: Vec<Expr> = self.group_by.iter().map(|name| col(name.as_str())).collect();
        let mut aggs: Vec<Expr> = self
            .aggregations
            .iter()
            .map(|(column, reduction)| reduction_expr(column, *reduction))
            .collect();
        aggs.push(col(ROW_ID_COLUMN).alias(SOURCE_ROW_IDS_COLUMN));
        aggs.push(len().alias(CONTRIBUTION_COUNTS_COLUMN));

        let mut grouped = df.lazy().group_by_stable(keys).agg(aggs).collect()?;
        let ids = mint_ids(grouped.height());
        grouped.insert_column(0, ids)?;
        Ok(grouped)
    }
}
