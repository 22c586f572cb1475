//! Lineage, error, transformation, and removal ledgers for one pipeline run.
//!
//! [`MetadataLedger`] is a cheap-to-clone handle; every wrapper of one run
//! holds a clone of the same handle. Separate runs must construct separate
//! ledgers.
//!
//! Lineage semantics:
//!
//! - identifiers carried over from the previous step get the step name
//!   appended to their history
//! - identifiers the step minted (aggregation, explode) start a fresh
//!   history containing only the step name
//! - unknown identifiers read back as an empty history

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::sync::{Arc, RwLock};
use std::time::Instant;

use chrono::{TimeDelta, Utc};
use polars::prelude::DataFrame;
use rowtrace_model::{Details, ErrorRecord, RemovedRow, RowId, Subject, TransformationRecord};
use tracing::{debug, error, info};

use crate::error::Result;
use crate::identity::row_ids;

#[derive(Debug, Default)]
struct LedgerState {
    lineage: HashMap<RowId, Vec<String>>,
    errors: Vec<ErrorRecord>,
    logs: Vec<TransformationRecord>,
    removed: Vec<RemovedRow>,
}

#[derive(Debug, Clone, Default)]
pub struct MetadataLedger {
    state: Arc<RwLock<LedgerState>>,
}

impl MetadataLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Give every identifier in `df` an empty history, discarding any
    /// previous lineage.
    pub fn initialize(&self, df: &DataFrame) -> Result<()> {
        let ids = row_ids(df)?;
        let count = ids.len();
        if let Ok(mut state) = self.state.write() {
            state.lineage = ids.into_iter().map(|id| (id, Vec::new())).collect();
        }
        debug!(row_count = count, "lineage initialized");
        Ok(())
    }

    /// Record that every row of `df` passed through `transformation`.
    pub fn update_lineage(
        &self,
        df: &DataFrame,
        transformation: &str,
        new_ids: &HashSet<RowId>,
    ) -> Result<()> {
        let ids = row_ids(df)?;
        let Ok(mut state) = self.state.write() else {
            return Ok(());
        };
        for id in ids {
            if new_ids.contains(&id) {
                state.lineage.insert(id, vec![transformation.to_string()]);
                continue;
            }
            match state.lineage.get_mut(&id) {
                Some(history) => history.push(transformation.to_string()),
                None => {
                    debug!(
                        row_id = %id,
                        transformation,
                        "row id has no lineage entry, starting a fresh one"
                    );
                    state.lineage.insert(id, vec![transformation.to_string()]);
                }
            }
        }
        Ok(())
    }

    pub fn get_lineage(&self, row_id: &RowId) -> Vec<String> {
        self.state
            .read()
            .ok()
            .and_then(|state| state.lineage.get(row_id).cloned())
            .unwrap_or_default()
    }

    /// All histories, ordered by identifier.
    pub fn lineage_snapshot(&self) -> BTreeMap<RowId, Vec<String>> {
        self.state
            .read()
            .map(|state| {
                state
                    .lineage
                    .iter()
                    .map(|(id, history)| (id.clone(), history.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn log_error(&self, subject: Subject, transformation: &str, error: &dyn fmt::Display) {
        let message = error.to_string();
        error!(
            row_id = %subject,
            transformation,
            "Error in transformation '{transformation}' for row '{subject}': {message}"
        );
        if let Ok(mut state) = self.state.write() {
            state.errors.push(ErrorRecord {
                subject,
                transformation: transformation.to_string(),
                error: message,
            });
        }
    }

    /// Append a timing record; the duration is measured from `start` to now.
    pub fn log_transformation(&self, transformation: &str, start: Instant, details: Details) {
        let elapsed = start.elapsed();
        let started_at = Utc::now() - TimeDelta::from_std(elapsed).unwrap_or(TimeDelta::zero());
        let duration_secs = elapsed.as_secs_f64();
        let row_count = details.get("row_count").and_then(serde_json::Value::as_u64);
        info!(
            transformation,
            duration_ms = elapsed.as_millis(),
            row_count,
            "Transformation '{transformation}' completed in {duration_secs:.2} seconds."
        );
        if let Ok(mut state) = self.state.write() {
            state.logs.push(TransformationRecord {
                transformation: transformation.to_string(),
                started_at,
                duration_secs,
                details,
            });
        }
    }

    /// Record rows a step dropped.
    pub fn log_removed_rows(&self, row_ids: &[RowId], transformation: &str, reason: &str) {
        if row_ids.is_empty() {
            return;
        }
        info!(
            transformation,
            removed = row_ids.len(),
            reason,
            "Transformation '{transformation}' removed {} rows.",
            row_ids.len()
        );
        if let Ok(mut state) = self.state.write() {
            state
                .removed
                .extend(row_ids.iter().map(|row_id| RemovedRow {
                    row_id: row_id.clone(),
                    transformation: transformation.to_string(),
                    reason: reason.to_string(),
                }));
        }
    }

    pub fn get_errors(&self) -> Vec<ErrorRecord> {
        self.state
            .read()
            .map(|state| state.errors.clone())
            .unwrap_or_default()
    }

    pub fn get_logs(&self) -> Vec<TransformationRecord> {
        self.state
            .read()
            .map(|state| state.logs.clone())
            .unwrap_or_default()
    }

    pub fn get_removed(&self) -> Vec<RemovedRow> {
        self.state
            .read()
            .map(|state| state.removed.clone())
            .unwrap_or_default()
    }

    /// Errors recorded against one row.
    pub fn errors_for(&self, row_id: &RowId) -> Vec<ErrorRecord> {
        self.get_errors()
            .into_iter()
            .filter(|record| record.subject.row_id() == Some(row_id))
            .collect()
    }

    /// Errors recorded against whole transformations.
    pub fn global_errors(&self) -> Vec<ErrorRecord> {
        self.get_errors()
            .into_iter()
            .filter(ErrorRecord::is_global)
            .collect()
    }

    pub fn has_errors(&self) -> bool {
        self.state
            .read()
            .map(|state| !state.errors.is_empty())
            .unwrap_or(false)
    }
}
