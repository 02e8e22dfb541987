//! Schema derivation and statement generation.
//!
//! - [`infer`]: whole-column type inference
//! - [`sanitize`]: header → identifier rewriting
//! - [`sql`]: `CREATE TABLE` / `INSERT` builders
//! - [`convert`]: raw cells → typed values for parameter binding

pub mod convert;
pub mod infer;
pub mod sanitize;
pub mod sql;

pub use convert::{parse_typed_value, typed_rows};
pub use infer::{infer_column_type, infer_types};
pub use sanitize::{sanitize_column_name, sanitize_headers};
pub use sql::{create_table_statement, insert_statement, quote_identifier, validate_table_name};

use crate::error::LoadResult;
use crate::types::{ColumnSpec, Dataset, TableSpec};

/// Derive the destination table layout for `dataset`.
///
/// Names and types are computed independently from the same columns and zipped in order.
pub fn table_spec(table: &str, dataset: &Dataset) -> LoadResult<TableSpec> {
    let names = sanitize_headers(table, dataset.headers())?;
    let types = infer_types(dataset);

    let columns = dataset
        .columns()
        .iter()
        .zip(names)
        .zip(types)
        .map(|((column, name), data_type)| ColumnSpec::new(name, column.header.clone(), data_type))
        .collect();

    Ok(TableSpec::new(table, columns))
}
