//! End-to-end pipeline runs: fault isolation, fatal steps, and run states.

use std::io;
use std::sync::{Arc, Mutex};

use polars::prelude::*;
use rowtrace_core::transforms::{FilterRows, GrowthRate, ValidateRows};
use rowtrace_core::{
    CoreError, FnTransformation, MetadataLedger, Pipeline, RunState, Tracked, row_ids,
};
use rowtrace_model::Subject;
use rowtrace_validate::{CompareOp, FieldType, Rule, Validator};
use tracing::Level;

fn growth_input() -> DataFrame {
    DataFrame::new(vec![
        Series::new("start_value".into(), vec![100_i64, 0, 200]).into(),
        Series::new("end_value".into(), vec![110_i64, 20, 240]).into(),
    ])
    .unwrap()
}

/// Log sink shared between a test and its subscriber.
#[derive(Clone, Default)]
struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    fn text(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Run `f` with debug logs captured.
fn with_debug_logs<R>(f: impl FnOnce() -> R) -> (R, String) {
    let logs = CapturedLogs::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();
    let result = tracing::subscriber::with_default(subscriber, f);
    (result, logs.text())
}

fn approx(actual: Option<f64>, expected: f64) -> bool {
    actual.is_some_and(|value| (value - expected).abs() < 1e-9)
}

#[test]
fn growth_rate_isolates_failing_row() {
    let ledger = MetadataLedger::new();
    let mut pipeline = Pipeline::builder(ledger.clone())
        .tracked(GrowthRate::new("growth_rate"))
        .build();

    let result = pipeline.run(&growth_input()).unwrap();
    assert_eq!(pipeline.state(), RunState::Completed);

    let growth = result.column("growth_rate").unwrap().f64().unwrap();
    assert!(approx(growth.get(0), 0.10));
    assert_eq!(growth.get(1), None);
    assert!(approx(growth.get(2), 0.20));

    let ids = row_ids(&result).unwrap();
    assert_eq!(ids.len(), 3);
    for id in &ids {
        assert_eq!(ledger.get_lineage(id), vec!["calculate_growth_rate"]);
    }

    let errors = ledger.get_errors();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].subject, Subject::Row(ids[1].clone()));
    assert_eq!(
        errors[0].transformation,
        "calculate_growth (column: growth_rate)"
    );
    assert_eq!(errors[0].error, "start_value must be greater than 0");
    assert!(ledger.global_errors().is_empty());

    let logs = ledger.get_logs();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].transformation, "calculate_growth_rate");
    assert_eq!(logs[0].row_count(), Some(3));
    assert!(logs[0].duration_secs >= 0.0);
}

#[test]
fn fallback_value_is_configurable() {
    let ledger = MetadataLedger::new();
    let mut pipeline = Pipeline::builder(ledger.clone())
        .tracked(GrowthRate::new("growth_rate").with_fallback(0.0))
        .build();

    let result = pipeline.run(&growth_input()).unwrap();
    let growth = result.column("growth_rate").unwrap().f64().unwrap();
    assert_eq!(growth.get(1), Some(0.0));
    assert_eq!(ledger.get_errors().len(), 1);
}

#[test]
fn failing_step_is_fatal_and_logged_once() {
    let ledger = MetadataLedger::new();
    let mut pipeline = Pipeline::builder(ledger.clone())
        .tracked(GrowthRate::new("growth_rate"))
        .tracked(FnTransformation::new("always_fails", |_df, _ctx| {
            Err(CoreError::step("always_fails", "boom"))
        }))
        .tracked(FnTransformation::new("never_runs", |df, _ctx| Ok(df)))
        .build();

    let outcome = pipeline.run(&growth_input());
    assert!(matches!(outcome, Err(CoreError::Step { .. })));
    assert_eq!(pipeline.state(), RunState::Failed);

    let global = ledger.global_errors();
    assert_eq!(global.len(), 1);
    assert_eq!(global[0].transformation, "always_fails");
    assert_eq!(
        global[0].error,
        "transformation `always_fails` failed: boom"
    );

    let logged: Vec<String> = ledger
        .get_logs()
        .into_iter()
        .map(|record| record.transformation)
        .collect();
    assert_eq!(logged, vec!["calculate_growth_rate"]);
}

#[test]
fn polars_failures_propagate_as_step_errors() {
    let ledger = MetadataLedger::new();
    let mut pipeline = Pipeline::builder(ledger.clone())
        .tracked(FnTransformation::new("select_missing", |df, _ctx| {
            Ok(df.select(["does_not_exist"])?)
        }))
        .build();

    assert!(matches!(
        pipeline.run(&growth_input()),
        Err(CoreError::Polars(_))
    ));
    assert_eq!(ledger.global_errors().len(), 1);
}

#[test]
fn validation_failure_fails_the_step() {
    let validator = Validator::new()
        .field("start_value", FieldType::Number)
        .rule(Rule::compare(
            "start must be positive",
            "start_value",
            CompareOp::Gt,
            0.0,
        ));
    let ledger = MetadataLedger::new();
    let mut pipeline = Pipeline::builder(ledger.clone())
        .tracked(ValidateRows::new(validator))
        .build();

    match pipeline.run(&growth_input()) {
        Err(CoreError::Validation(error)) => {
            assert_eq!(
                error.get("validate_row -> start must be positive"),
                Some("Validation failed: start must be positive")
            );
        }
        other => panic!("expected validation failure, got {other:?}"),
    }
    assert_eq!(pipeline.state(), RunState::Failed);

    let errors = ledger.get_errors();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].is_global());
    assert_eq!(errors[0].transformation, "validate_rows");
}

#[test]
fn filter_records_removed_rows() {
    let ledger = MetadataLedger::new();
    let mut pipeline = Pipeline::builder(ledger.clone())
        .tracked(GrowthRate::new("growth_rate"))
        .tracked(
            FilterRows::new("filter_high_growth", col("growth_rate").gt(lit(0.15)))
                .with_reason("growth_rate <= 0.15"),
        )
        .build();

    let result = pipeline.run(&growth_input()).unwrap();
    assert_eq!(result.height(), 1);

    let kept = row_ids(&result).unwrap();
    assert_eq!(
        ledger.get_lineage(&kept[0]),
        vec!["calculate_growth_rate", "filter_high_growth"]
    );

    let removed = ledger.get_removed();
    assert_eq!(removed.len(), 2);
    assert!(removed.iter().all(|row| row.transformation == "filter_high_growth"));
    assert!(removed.iter().all(|row| row.reason == "growth_rate <= 0.15"));
    assert!(removed.iter().all(|row| row.row_id != kept[0]));
}

#[test]
fn untracked_steps_leave_no_metadata() {
    let ledger = MetadataLedger::new();
    let mut pipeline = Pipeline::builder(ledger.clone())
        .step(GrowthRate::new("growth_rate"))
        .build();

    let result = pipeline.run(&growth_input()).unwrap();
    for id in row_ids(&result).unwrap() {
        assert!(ledger.get_lineage(&id).is_empty());
    }
    assert!(ledger.get_logs().is_empty());
    // Row-level isolation still reports through the run's ledger.
    assert_eq!(ledger.get_errors().len(), 1);
}

#[test]
fn tracked_wrapper_runs_outside_a_pipeline() {
    let ledger = MetadataLedger::new();
    let input = rowtrace_core::assign_row_ids(&growth_input()).unwrap();
    ledger.initialize(&input).unwrap();

    let tracked = Tracked::new(GrowthRate::new("growth_rate"), ledger.clone());
    let result = tracked.run(input).unwrap();
    assert_eq!(result.height(), 3);
    assert_eq!(ledger.get_logs().len(), 1);

    let unidentified = tracked.run(growth_input());
    assert!(matches!(unidentified, Err(CoreError::MissingRowIdColumn)));
    assert_eq!(ledger.global_errors().len(), 1);
}

#[test]
fn rerun_reinitializes_lineage() {
    let ledger = MetadataLedger::new();
    let mut pipeline = Pipeline::builder(ledger.clone())
        .tracked(GrowthRate::new("growth_rate"))
        .build();

    let first = pipeline.run(&growth_input()).unwrap();
    let second = pipeline.run(&growth_input()).unwrap();
    assert_eq!(pipeline.state(), RunState::Completed);

    let first_ids = row_ids(&first).unwrap();
    assert!(ledger.get_lineage(&first_ids[0]).is_empty());
    for id in row_ids(&second).unwrap() {
        assert_eq!(ledger.get_lineage(&id), vec!["calculate_growth_rate"]);
    }
    assert_eq!(ledger.get_logs().len(), 2);
}

#[test]
fn duplicate_output_ids_fail_the_step() {
    let ledger = MetadataLedger::new();
    let mut pipeline = Pipeline::builder(ledger.clone())
        .tracked(GrowthRate::new("growth_rate"))
        .tracked(FnTransformation::new("self_union", |df, _ctx| {
            Ok(df.vstack(&df)?)
        }))
        .build();

    match pipeline.run(&growth_input()) {
        Err(CoreError::Step { transformation, message }) => {
            assert_eq!(transformation, "self_union");
            assert!(message.starts_with("output contains duplicate row id"));
        }
        other => panic!("expected duplicate id failure, got {other:?}"),
    }
    assert_eq!(pipeline.state(), RunState::Failed);

    let global = ledger.global_errors();
    assert_eq!(global.len(), 1);
    assert_eq!(global[0].transformation, "self_union");
    for (_, history) in ledger.lineage_snapshot() {
        assert_eq!(history, vec!["calculate_growth_rate"]);
    }
}

#[test]
fn failures_log_the_offending_input() {
    let ledger = MetadataLedger::new();
    let mut pipeline = Pipeline::builder(ledger.clone())
        .tracked(GrowthRate::new("growth_rate"))
        .tracked(FnTransformation::new("always_fails", |_df, _ctx| {
            Err(CoreError::step("always_fails", "boom"))
        }))
        .build();

    let (outcome, logs) = with_debug_logs(|| pipeline.run(&growth_input()));
    assert!(outcome.is_err());

    let row_failure = logs
        .lines()
        .find(|line| line.contains("row function failed on input"))
        .expect("row failure logged");
    assert!(row_failure.contains("calculate_growth (column: growth_rate)"));
    assert!(row_failure.contains("start_value"));

    let step_failure = logs
        .lines()
        .find(|line| line.contains("transformation failed on input"))
        .expect("step failure logged");
    assert!(step_failure.contains("always_fails"));
    assert!(step_failure.contains("end_value"));
}
