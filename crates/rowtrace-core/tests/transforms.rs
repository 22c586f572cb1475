use polars::prelude::*;
use rowtrace_core::transforms::{
    Aggregate, CONTRIBUTION_COUNTS_COLUMN, FilterRows, SOURCE_ROW_IDS_COLUMN, growth_rate,
};
use rowtrace_core::{CoreError, MetadataLedger, Pipeline, RowError, row_ids};
use rowtrace_model::{Reduction, Row, RowId, Value};

fn sales() -> DataFrame {
    DataFrame::new(vec![
        Series::new("region".into(), vec!["north", "south", "north", "east"]).into(),
        Series::new("amount".into(), vec![Some(10_i64), Some(5), None, Some(7)]).into(),
    ])
    .unwrap()
}

#[test]
fn growth_rate_reports_missing_fields() {
    let row = Row::new(Some(RowId::mint())).with("start_value", 10_i64);
    let error = growth_rate(&row, "start_value", "end_value").unwrap_err();
    assert!(matches!(error, RowError::Field(_)));
    assert_eq!(error.to_string(), "missing field: end_value");
}

#[test]
fn filter_drops_null_predicate_rows() {
    let ledger = MetadataLedger::new();
    let mut pipeline = Pipeline::builder(ledger.clone())
        .tracked(FilterRows::new("positive_amount", col("amount").gt(lit(0))))
        .build();

    let result = pipeline.run(&sales()).unwrap();
    assert_eq!(result.height(), 3);

    let removed = ledger.get_removed();
    assert_eq!(removed.len(), 1);
    assert_eq!(removed[0].reason, "positive_amount");
    // Removed rows keep the history they had before the filter.
    assert!(ledger.get_lineage(&removed[0].row_id).is_empty());
    assert!(ledger.errors_for(&removed[0].row_id).is_empty());
}

#[test]
fn filter_keeping_everything_logs_nothing_removed() {
    let ledger = MetadataLedger::new();
    let mut pipeline = Pipeline::builder(ledger.clone())
        .tracked(FilterRows::new("any_region", col("region").is_not_null()))
        .build();

    pipeline.run(&sales()).unwrap();
    assert!(ledger.get_removed().is_empty());
    assert_eq!(ledger.get_logs()[0].row_count(), Some(4));
}

#[test]
fn aggregate_keeps_first_appearance_order() {
    let ledger = MetadataLedger::new();
    let mut pipeline = Pipeline::builder(ledger.clone())
        .tracked(Aggregate::new(["region"]).with("amount", Reduction::Sum))
        .build();

    let result = pipeline.run(&sales()).unwrap();

    let regions: Vec<Option<&str>> = result
        .column("region")
        .unwrap()
        .str()
        .unwrap()
        .into_iter()
        .collect();
    assert_eq!(regions, vec![Some("north"), Some("south"), Some("east")]);

    let counts = result
        .column(CONTRIBUTION_COUNTS_COLUMN)
        .unwrap()
        .cast(&DataType::UInt64)
        .unwrap();
    let counts: Vec<Option<u64>> = counts.u64().unwrap().into_iter().collect();
    assert_eq!(counts, vec![Some(2), Some(1), Some(1)]);

    let totals: Vec<Option<i64>> = result
        .column("amount")
        .unwrap()
        .i64()
        .unwrap()
        .into_iter()
        .collect();
    assert_eq!(totals, vec![Some(10), Some(5), Some(7)]);

    let sources = result.column(SOURCE_ROW_IDS_COLUMN).unwrap().list().unwrap();
    let north = sources.get_as_series(0).unwrap();
    assert_eq!(north.len(), 2);

    for id in row_ids(&result).unwrap() {
        assert_eq!(ledger.get_lineage(&id), vec!["aggregate_with_details"]);
    }
}

#[test]
fn aggregate_requires_group_columns() {
    let ledger = MetadataLedger::new();
    let mut pipeline = Pipeline::builder(ledger.clone())
        .tracked(Aggregate::new(Vec::<String>::new()).with("amount", Reduction::Sum))
        .build();

    let error = pipeline.run(&sales()).unwrap_err();
    assert!(matches!(error, CoreError::Step { .. }));
    assert_eq!(
        error.to_string(),
        "transformation `aggregate_with_details` failed: at least one group-by column is required"
    );
    assert_eq!(ledger.global_errors().len(), 1);
}

#[test]
fn aggregate_list_reduction_collects_values() {
    let ledger = MetadataLedger::new();
    let mut pipeline = Pipeline::builder(ledger)
        .tracked(Aggregate::new(["region"]).with("amount", Reduction::List))
        .build();

    let result = pipeline.run(&sales()).unwrap();
    let amounts = result.column("amount").unwrap().list().unwrap();
    let north = amounts.get_as_series(0).unwrap();
    let values: Vec<Option<i64>> = north.i64().unwrap().into_iter().collect();
    assert_eq!(values, vec![Some(10), None]);
}

#[test]
fn row_values_see_null_cells_as_null() {
    let input = rowtrace_core::assign_row_ids(&sales()).unwrap();
    let rows = rowtrace_core::frame::rows(&input).unwrap();
    assert_eq!(rows.len(), 4);
    assert_eq!(rows[2].get("amount"), Some(&Value::Null));
    assert!(rows.iter().all(|row| row.row_id().is_some()));
}
