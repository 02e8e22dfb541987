//! Core data model types for loading.
//!
//! The loader reads a delimited file into a columnar [`Dataset`] of raw text cells. Each
//! column is then classified into an [`InferredType`], and the pair (sanitized name, type)
//! becomes a [`ColumnSpec`] inside a [`TableSpec`].

use std::fmt;

use chrono::NaiveDateTime;

/// Storage classification of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InferredType {
    /// Every value is a base-10 integer.
    Integer,
    /// Every value is a decimal number.
    Float,
    /// Every value is purely textual.
    Text,
    /// Every value is a recognized date/time.
    Timestamp,
    /// Mixed shapes, or no values at all.
    Generic,
}

impl InferredType {
    /// The SQL storage type used in `CREATE TABLE`.
    pub fn sql_type(self) -> &'static str {
        match self {
            InferredType::Integer => "INT",
            InferredType::Float => "FLOAT",
            InferredType::Timestamp => "TIMESTAMP",
            InferredType::Text => "VARCHAR",
            InferredType::Generic => "TEXT",
        }
    }
}

impl fmt::Display for InferredType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.sql_type())
    }
}

/// A header plus its raw cells, one per row.
///
/// `None` marks a missing cell. Missing cells still occupy their row slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    /// Header exactly as it appeared in the file.
    pub header: String,
    /// Raw cell values in row order.
    pub values: Vec<Option<String>>,
}

impl Column {
    /// Create a new column.
    pub fn new(header: impl Into<String>, values: Vec<Option<String>>) -> Self {
        Self {
            header: header.into(),
            values,
        }
    }

    /// Number of cells that are not missing.
    pub fn present_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_some()).count()
    }
}

/// In-memory table loaded from one file.
///
/// Columns are stored in file order. Every column has the same length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dataset {
    columns: Vec<Column>,
    row_count: usize,
    /// 1-based source line each row starts on.
    lines: Vec<u64>,
}

impl Dataset {
    /// Create a dataset from columns.
    ///
    /// Rows are assumed to follow a one-line header, one line each.
    /// Returns `None` if the columns do not all have the same length.
    pub fn new(columns: Vec<Column>) -> Option<Self> {
        let row_count = columns.first().map(|c| c.values.len()).unwrap_or(0);
        let lines = (2..).take(row_count).collect();
        Self::with_lines(columns, lines)
    }

    /// Create a dataset whose rows start on the given source lines.
    ///
    /// Returns `None` if the columns and `lines` do not all have the same length.
    pub fn with_lines(columns: Vec<Column>, lines: Vec<u64>) -> Option<Self> {
        let row_count = lines.len();
        if columns.iter().any(|c| c.values.len() != row_count) {
            return None;
        }
        Some(Self {
            columns,
            row_count,
            lines,
        })
    }

    /// Columns in file order.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Number of rows in the dataset.
    pub fn row_count(&self) -> usize {
        self.row_count
    }

    /// Number of columns in the dataset.
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Iterate headers in order.
    pub fn headers(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.header.as_str())
    }

    /// Source line on which row `idx` starts.
    pub fn line_of(&self, idx: usize) -> Option<u64> {
        self.lines.get(idx).copied()
    }

    /// Raw cells of row `idx`, in column order.
    pub fn row(&self, idx: usize) -> Option<Vec<Option<&str>>> {
        if idx >= self.row_count {
            return None;
        }
        Some(
            self.columns
                .iter()
                .map(|c| c.values[idx].as_deref())
                .collect(),
        )
    }

    /// The first `n` rows, for previews.
    pub fn head(&self, n: usize) -> Vec<Vec<Option<&str>>> {
        (0..n.min(self.row_count))
            .filter_map(|i| self.row(i))
            .collect()
    }
}

/// One destination column: sanitized name plus inferred type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSpec {
    /// Sanitized identifier used in generated SQL.
    pub name: String,
    /// Header the name was derived from.
    pub source_header: String,
    /// Inferred storage type.
    pub data_type: InferredType,
}

impl ColumnSpec {
    pub fn new(
        name: impl Into<String>,
        source_header: impl Into<String>,
        data_type: InferredType,
    ) -> Self {
        Self {
            name: name.into(),
            source_header: source_header.into(),
            data_type,
        }
    }
}

/// The (table name, typed columns) description used to generate statements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSpec {
    /// Destination table name.
    pub table: String,
    /// Ordered destination columns, matching the dataset's column order.
    pub columns: Vec<ColumnSpec>,
}

impl TableSpec {
    pub fn new(table: impl Into<String>, columns: Vec<ColumnSpec>) -> Self {
        Self {
            table: table.into(),
            columns,
        }
    }

    /// Column types in order.
    pub fn column_types(&self) -> Vec<InferredType> {
        self.columns.iter().map(|c| c.data_type).collect()
    }
}

/// A single typed value handed to the database driver.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Missing value.
    Null,
    /// 64-bit signed integer.
    Int64(i64),
    /// 64-bit float.
    Float64(f64),
    /// Date and time without a zone.
    Timestamp(NaiveDateTime),
    /// UTF-8 string, passed through unchanged.
    Utf8(String),
}

#[cfg(test)]
mod tests {
    use super::{Column, Dataset, InferredType};

    fn cells(values: &[&str]) -> Vec<Option<String>> {
        values
            .iter()
            .map(|v| (!v.is_empty()).then(|| v.to_string()))
            .collect()
    }

    #[test]
    fn dataset_rejects_ragged_columns() {
        let ds = Dataset::new(vec![
            Column::new("a", cells(&["1", "2"])),
            Column::new("b", cells(&["x"])),
        ]);
        assert!(ds.is_none());
    }

    #[test]
    fn head_returns_rows_in_column_order() {
        let ds = Dataset::new(vec![
            Column::new("a", cells(&["1", "2", "3"])),
            Column::new("b", cells(&["x", "", "z"])),
        ])
        .unwrap();

        assert_eq!(ds.row_count(), 3);
        assert_eq!(
            ds.head(2),
            vec![vec![Some("1"), Some("x")], vec![Some("2"), None]]
        );
        assert_eq!(ds.head(10).len(), 3);
    }

    #[test]
    fn rows_default_to_one_line_each_after_the_header() {
        let ds = Dataset::new(vec![Column::new("a", cells(&["1", "2"]))]).unwrap();
        assert_eq!(ds.line_of(0), Some(2));
        assert_eq!(ds.line_of(1), Some(3));
        assert_eq!(ds.line_of(2), None);

        let ds =
            Dataset::with_lines(vec![Column::new("a", cells(&["1", "2"]))], vec![4, 9]).unwrap();
        assert_eq!(ds.line_of(1), Some(9));
        assert!(Dataset::with_lines(vec![Column::new("a", cells(&["1"]))], vec![2, 3]).is_none());
    }

    #[test]
    fn sql_types_follow_fixed_mapping() {
        assert_eq!(InferredType::Integer.sql_type(), "INT");
        assert_eq!(InferredType::Float.sql_type(), "FLOAT");
        assert_eq!(InferredType::Timestamp.sql_type(), "TIMESTAMP");
        assert_eq!(InferredType::Text.sql_type(), "VARCHAR");
        assert_eq!(InferredType::Generic.sql_type(), "TEXT");
    }
}
