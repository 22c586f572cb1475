//! Conversions between polars frames and [`Row`] records.
//!
//! Row-level functions see a dataset one [`Row`] at a time; their results are
//! written back as a single column whose dtype is inferred from the values.

use polars::prelude::{AnyValue, DataFrame, DataType, NamedFrom, Series};
use rowtrace_model::{Row, Value};

use crate::error::Result;

pub fn any_to_value(value: AnyValue) -> Value {
    match value {
        AnyValue::Null => Value::Null,
        AnyValue::Boolean(value) => Value::Bool(value),
        AnyValue::String(value) => Value::Str(value.to_string()),
        AnyValue::StringOwned(value) => Value::Str(value.to_string()),
        AnyValue::Int8(value) => Value::Int(value.into()),
        AnyValue::Int16(value) => Value::Int(value.into()),
        AnyValue::Int32(value) => Value::Int(value.into()),
        AnyValue::Int64(value) => Value::Int(value),
        AnyValue::UInt8(value) => Value::Int(value.into()),
        AnyValue::UInt16(value) => Value::Int(value.into()),
        AnyValue::UInt32(value) => Value::Int(value.into()),
        AnyValue::UInt64(value) => match i64::try_from(value) {
            Ok(value) => Value::Int(value),
            Err(_) => Value::Float(value as f64),
        },
        AnyValue::Float32(value) => Value::Float(value.into()),
        AnyValue::Float64(value) => Value::Float(value),
        AnyValue::List(series) | AnyValue::Array(series, _) => Value::List(series_values(&series)),
        other => Value::Str(other.to_string()),
    }
}

fn series_values(series: &Series) -> Vec<Value> {
    (0..series.len())
        .map(|idx| series.get(idx).map_or(Value::Null, any_to_value))
        .collect()
}

/// Extract row `idx` with every column of the frame.
pub fn row_at(df: &DataFrame, idx: usize) -> Result<Row> {
    let mut row = Row::default();
    for column in df.get_columns() {
        let value = any_to_value(column.get(idx)?);
        row.insert(column.name().as_str(), value);
    }
    Ok(row)
}

/// Extract every row of the frame, in order.
pub fn rows(df: &DataFrame) -> Result<Vec<Row>> {
    (0..df.height()).map(|idx| row_at(df, idx)).collect()
}

/// Build a column from computed values.
///
/// Integers and floats widen to `Float64` when mixed; any other mix falls
/// back to a string column using each value's display form.
pub fn values_to_series(name: &str, values: &[Value]) -> Result<Series> {
    let present = || values.iter().filter(|value| !value.is_null());

    if present().next().is_none() {
        return Ok(Series::full_null(name.into(), values.len(), &DataType::Null));
    }
    if present().all(|value| matches!(value, Value::Int(_))) {
        let data: Vec<Option<i64>> = values.iter().map(Value::as_i64).collect();
        return Ok(Series::new(name.into(), data));
    }
    if present().all(|value| matches!(value, Value::Int(_) | Value::Float(_))) {
        let data: Vec<Option<f64>> = values.iter().map(Value::as_f64).collect();
        return Ok(Series::new(name.into(), data));
    }
    if present().all(|value| matches!(value, Value::Bool(_))) {
        let data: Vec<Option<bool>> = values.iter().map(Value::as_bool).collect();
        return Ok(Series::new(name.into(), data));
    }
    if present().all(|value| matches!(value, Value::List(_))) {
        let mut data: Vec<Option<Series>> = Vec::with_capacity(values.len());
        for value in values {
            match value.as_list() {
                Some(items) => data.push(Some(values_to_series("", items)?)),
                None => data.push(None),
            }
        }
        return Ok(Series::new(name.into(), data));
    }
    let data: Vec<Option<String>> = values
        .iter()
        .map(|value| (!value.is_null()).then(|| value.to_string()))
        .collect();
    Ok(Series::new(name.into(), data))
}
