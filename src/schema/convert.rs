//! Raw cell → typed [`Value`] conversion.

use crate::error::{LoadError, LoadResult};
use crate::types::{Dataset, InferredType, Value};

use super::infer::{parse_float, parse_integer, parse_timestamp};

/// Convert every row of `dataset` into typed values, one column type per column.
///
/// Text and Generic cells are passed through verbatim; missing cells become [`Value::Null`].
pub fn typed_rows(dataset: &Dataset, types: &[InferredType]) -> LoadResult<Vec<Vec<Value>>> {
    if types.len() != dataset.column_count() {
        return Err(LoadError::config(format!(
            "{} column types given for {} columns",
            types.len(),
            dataset.column_count()
        )));
    }

    let columns = dataset.columns();
    let mut rows = Vec::with_capacity(dataset.row_count());
    for row_idx in 0..dataset.row_count() {
        let user_row = dataset
            .line_of(row_idx)
            .map_or(row_idx + 2, |line| line as usize);
        let mut row = Vec::with_capacity(columns.len());
        for (column, data_type) in columns.iter().zip(types) {
            let raw = column.values[row_idx].as_deref();
            row.push(parse_typed_value(user_row, &column.header, *data_type, raw)?);
        }
        rows.push(row);
    }
    Ok(rows)
}

/// Convert a single cell under `data_type`.
pub fn parse_typed_value(
    row: usize,
    column: &str,
    data_type: InferredType,
    raw: Option<&str>,
) -> LoadResult<Value> {
    let Some(raw) = raw else {
        return Ok(Value::Null);
    };

    let trimmed = raw.trim();
    let parsed = match data_type {
        InferredType::Text | InferredType::Generic => return Ok(Value::Utf8(raw.to_owned())),
        InferredType::Integer => parse_integer(trimmed).map(Value::Int64),
        InferredType::Float => parse_float(trimmed).map(Value::Float64),
        InferredType::Timestamp => parse_timestamp(trimmed).map(Value::Timestamp),
    };

    parsed.ok_or_else(|| LoadError::ParseError {
        row,
        column: column.to_owned(),
        raw: raw.to_owned(),
        message: format!("expected {}", data_type.sql_type()),
    })
}
