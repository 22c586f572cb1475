//! Ledger records produced while a pipeline runs.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::ids::{RowId, Subject};

/// Free-form details attached to a transformation log record.
pub type Details = BTreeMap<String, serde_json::Value>;

/// A failure attributed to one row or to a whole transformation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorRecord {
    #[serde(rename = "row_id")]
    pub subject: Subject,
    pub transformation: String,
    pub error: String,
}

impl ErrorRecord {
    pub fn is_global(&self) -> bool {
        self.subject.is_global()
    }
}

/// Timing and detail record for one successful transformation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransformationRecord {
    pub transformation: String,
    pub started_at: DateTime<Utc>,
    /// Elapsed wall time in seconds.
    #[serde(rename = "time")]
    pub duration_secs: f64,
    pub details: Details,
}

impl TransformationRecord {
    /// The `row_count` detail, when present.
    pub fn row_count(&self) -> Option<u64> {
        self.details
            .get("row_count")
            .and_then(serde_json::Value::as_u64)
    }
}

/// A row dropped by a filtering step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemovedRow {
    pub row_id: RowId,
    pub transformation: String,
    pub reason: String,
}
