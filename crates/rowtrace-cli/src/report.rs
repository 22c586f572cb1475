//! Run report assembled from a finished pipeline and its ledger.

use std::collections::BTreeMap;

use serde::Serialize;

use rowtrace_core::{MetadataLedger, Pipeline};
use rowtrace_model::{ErrorRecord, RemovedRow, RowId, TransformationRecord};

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub state: &'static str,
    pub steps: Vec<String>,
    pub input_rows: usize,
    pub output_rows: Option<usize>,
    /// Error that stopped the run, if any.
    pub failure: Option<String>,
    pub lineage: BTreeMap<RowId, Vec<String>>,
    pub errors: Vec<ErrorRecord>,
    pub logs: Vec<TransformationRecord>,
    pub removed: Vec<RemovedRow>,
}

impl RunReport {
    pub fn collect(
        pipeline: &Pipeline,
        input_rows: usize,
        output_rows: Option<usize>,
        failure: Option<String>,
    ) -> Self {
        let ledger: &MetadataLedger = pipeline.ledger();
        Self {
            state: pipeline.state().as_str(),
            steps: pipeline
                .step_names()
                .into_iter()
                .map(str::to_string)
                .collect(),
            input_rows,
            output_rows,
            failure,
            lineage: ledger.lineage_snapshot(),
            errors: ledger.get_errors(),
            logs: ledger.get_logs(),
            removed: ledger.get_removed(),
        }
    }

    /// True when the run failed or any row-level error was recorded.
    pub fn has_errors(&self) -> bool {
        self.failure.is_some() || !self.errors.is_empty()
    }

    pub fn row_error_count(&self) -> usize {
        self.errors.iter().filter(|record| !record.is_global()).count()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
