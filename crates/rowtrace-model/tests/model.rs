//! Tests for rowtrace-model types.

use std::collections::BTreeMap;

use chrono::Utc;
use rowtrace_model::{
    ErrorRecord, RemovedRow, Row, RowId, Subject, TransformationRecord, ValidationError, Value,
};

#[test]
fn validation_error_display_lists_fields() {
    let mut errors = BTreeMap::new();
    errors.insert("age".to_string(), "Missing key: age".to_string());
    errors.insert("name".to_string(), "Expected str, got int".to_string());
    let error = ValidationError::new(errors);

    insta::assert_snapshot!(
        error.to_string(),
        @r#"Validation failed: {"age": "Missing key: age", "name": "Expected str, got int"}"#
    );
}

#[test]
fn validation_context_prefixes_keys() {
    let error = ValidationError::single("start_value", "must be positive")
        .with_context("calculate_growth");

    assert_eq!(
        error.get("calculate_growth -> start_value"),
        Some("must be positive")
    );
    assert_eq!(error.len(), 1);
}

#[test]
fn error_record_serializes_global_sentinel() {
    let record = ErrorRecord {
        subject: Subject::Global,
        transformation: "aggregate_with_details".to_string(),
        error: "boom".to_string(),
    };
    let json = serde_json::to_string(&record).expect("serialize record");
    assert_eq!(
        json,
        r#"{"row_id":"global","transformation":"aggregate_with_details","error":"boom"}"#
    );
    assert!(record.is_global());
}

#[test]
fn transformation_record_exposes_row_count() {
    let mut details = BTreeMap::new();
    details.insert("row_count".to_string(), serde_json::json!(3));
    let record = TransformationRecord {
        transformation: "filter_positive_growth".to_string(),
        started_at: Utc::now(),
        duration_secs: 0.01,
        details,
    };
    assert_eq!(record.row_count(), Some(3));
}

#[test]
fn row_serializes_with_identifier_first() {
    let id = RowId::new("r-1").expect("valid id");
    let row = Row::new(Some(id.clone()))
        .with("start_value", 100_i64)
        .with("growth", Value::Null);
    let json = serde_json::to_value(&row).expect("serialize row");
    assert_eq!(json["row_id"], "r-1");
    assert_eq!(json["start_value"], 100);
    assert!(json["growth"].is_null());

    let removed = RemovedRow {
        row_id: id,
        transformation: "filter".to_string(),
        reason: "growth <= 0".to_string(),
    };
    assert_eq!(
        serde_json::to_value(&removed).expect("serialize removed")["row_id"],
        "r-1"
    );
}
