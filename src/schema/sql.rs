//! Statement generation for table creation and row insertion.

use crate::error::{LoadError, LoadResult};
use crate::types::TableSpec;

/// Wrap a column identifier in double quotes.
///
/// Embedded double quotes are doubled, so a partially sanitized name still forms one identifier.
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Check that a configured table name can be spliced into SQL unquoted.
///
/// Accepts ASCII letters, digits and `_`, not starting with a digit.
pub fn validate_table_name(table: &str) -> LoadResult<()> {
    let mut chars = table.chars();
    let valid_start = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
    if valid_start && chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        Ok(())
    } else {
        Err(LoadError::config(format!(
            "table name {table:?} must match [A-Za-z_][A-Za-z0-9_]*"
        )))
    }
}

/// `CREATE TABLE IF NOT EXISTS <table> ("<col1>" <TYPE1>, ...)`
pub fn create_table_statement(spec: &TableSpec) -> String {
    let columns = spec
        .columns
        .iter()
        .map(|c| format!("{} {}", quote_identifier(&c.name), c.data_type.sql_type()))
        .collect::<Vec<_>>()
        .join(", ");
    format!("CREATE TABLE IF NOT EXISTS {} ({columns})", spec.table)
}

/// `INSERT INTO <table> ("<col1>", ...) VALUES (<p1>, ...)`
///
/// `placeholder` receives the 1-based parameter index.
pub fn insert_statement(spec: &TableSpec, placeholder: impl Fn(usize) -> String) -> String {
    let columns = spec
        .columns
        .iter()
        .map(|c| quote_identifier(&c.name))
        .collect::<Vec<_>>()
        .join(", ");
    let params = (1..=spec.columns.len())
        .map(placeholder)
        .collect::<Vec<_>>()
        .join(", ");
    format!("INSERT INTO {} ({columns}) VALUES ({params})", spec.table)
}

#[cfg(test)]
mod tests {
    use super::{create_table_statement, insert_statement, quote_identifier, validate_table_name};
    use crate::types::{ColumnSpec, InferredType, TableSpec};

    fn population_spec() -> TableSpec {
        TableSpec::new(
            "Population",
            vec![
                ColumnSpec::new("Rank", "Rank", InferredType::Integer),
                ColumnSpec::new("Country", "Country", InferredType::Text),
                ColumnSpec::new("Population2023", "Population (2023)", InferredType::Integer),
                ColumnSpec::new("Growth", "Growth %", InferredType::Float),
                ColumnSpec::new("Updated", "Updated", InferredType::Timestamp),
                ColumnSpec::new("Notes", "Notes", InferredType::Generic),
            ],
        )
    }

    #[test]
    fn create_statement_lists_quoted_columns_in_order() {
        assert_eq!(
            create_table_statement(&population_spec()),
            "CREATE TABLE IF NOT EXISTS Population (\"Rank\" INT, \"Country\" VARCHAR, \
             \"Population2023\" INT, \"Growth\" FLOAT, \"Updated\" TIMESTAMP, \"Notes\" TEXT)"
        );
    }

    #[test]
    fn insert_statement_uses_one_placeholder_per_column() {
        let spec = population_spec();
        assert_eq!(
            insert_statement(&spec, |i| format!("${i}")),
            "INSERT INTO Population (\"Rank\", \"Country\", \"Population2023\", \"Growth\", \
             \"Updated\", \"Notes\") VALUES ($1, $2, $3, $4, $5, $6)"
        );
        assert!(
            insert_statement(&spec, |i| format!("?{i}"))
                .ends_with("VALUES (?1, ?2, ?3, ?4, ?5, ?6)")
        );
    }

    #[test]
    fn identifiers_with_quotes_are_escaped() {
        assert_eq!(quote_identifier("a\"b"), "\"a\"\"b\"");
    }

    #[test]
    fn table_names_are_validated() {
        assert!(validate_table_name("Democracy_Index").is_ok());
        assert!(validate_table_name("_staging2").is_ok());
        assert!(validate_table_name("").is_err());
        assert!(validate_table_name("2024_data").is_err());
        assert!(validate_table_name("x; DROP TABLE y").is_err());
        assert!(validate_table_name("Life Expectancy").is_err());
    }
}
