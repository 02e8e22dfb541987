//! Delimited-text loading.
//!
//! Files are read with the `csv` crate into a columnar [`Dataset`] of raw text cells.
//! No type coercion happens here.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{LoadError, LoadResult};
use crate::types::{Column, Dataset};

/// Missing-value spellings recognized by default.
pub const DEFAULT_MISSING_VALUES: &[&str] = &[
    "", "NA", "N/A", "n/a", "NaN", "nan", "-NaN", "null", "NULL", "None", "#N/A", "<NA>",
];

/// Set of cell spellings treated as missing.
///
/// Cells are trimmed before comparison; an empty cell is always missing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MissingValues(Vec<String>);

impl MissingValues {
    /// Create a set from explicit tokens.
    pub fn new<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(tokens.into_iter().map(Into::into).collect())
    }

    /// Only empty cells are missing.
    pub fn empty_only() -> Self {
        Self(Vec::new())
    }

    /// Returns `true` if `raw` should be treated as a missing value.
    pub fn is_missing(&self, raw: &str) -> bool {
        let trimmed = raw.trim();
        trimmed.is_empty() || self.0.iter().any(|t| t == trimmed)
    }
}

impl Default for MissingValues {
    fn default() -> Self {
        Self::new(DEFAULT_MISSING_VALUES.iter().copied())
    }
}

/// Options for reading one delimited file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvOptions {
    /// Field separator byte.
    pub delimiter: u8,
    /// Quote byte wrapping fields that contain separators or newlines.
    pub quote: u8,
    /// Cells treated as missing.
    pub missing: MissingValues,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            quote: b'"',
            missing: MissingValues::default(),
        }
    }
}

impl CsvOptions {
    /// Build options from a configured delimiter string and quote character.
    ///
    /// See [`normalize_delimiter`] for the accepted delimiter spellings.
    pub fn from_config(delimiter: &str, quote: char, missing: MissingValues) -> LoadResult<Self> {
        let quote = ascii_byte(quote).ok_or_else(|| {
            LoadError::config(format!("quote must be a single ASCII character, got {quote:?}"))
        })?;
        let delimiter = normalize_delimiter(delimiter, quote)?;
        if delimiter == quote {
            return Err(LoadError::config(format!(
                "delimiter and quote must differ (both are {:?})",
                delimiter as char
            )));
        }
        Ok(Self {
            delimiter,
            quote,
            missing,
        })
    }
}

/// Normalize a configured delimiter into a single separator byte.
///
/// - A single ASCII character is used as-is.
/// - `<quote><sep><quote>` (e.g. `","` for files where every field is quoted) becomes `<sep>`;
///   quote-aware parsing strips the wrapping quotes from each field.
pub fn normalize_delimiter(delimiter: &str, quote: u8) -> LoadResult<u8> {
    let chars: Vec<char> = delimiter.chars().collect();
    let sep = match chars.as_slice() {
        [c] => *c,
        [open, c, close]
            if ascii_byte(*open) == Some(quote) && ascii_byte(*close) == Some(quote) =>
        {
            *c
        }
        _ => {
            return Err(LoadError::config(format!(
                "unsupported delimiter {delimiter:?}: \
                 expected one character or <quote><char><quote>"
            )));
        }
    };
    ascii_byte(sep)
        .ok_or_else(|| LoadError::config(format!("delimiter must be ASCII, got {sep:?}")))
}

fn ascii_byte(c: char) -> Option<u8> {
    c.is_ascii().then_some(c as u8)
}

/// Load a delimited file into an in-memory [`Dataset`].
///
/// Rules:
///
/// - The first non-empty line is the header row.
/// - Every record must have as many fields as the header.
/// - Cells are kept as text; missing cells become `None`.
pub fn load_csv_from_path(path: impl AsRef<Path>, options: &CsvOptions) -> LoadResult<Dataset> {
    let path = path.as_ref();
    let file = File::open(path)?;
    load_named(file, path, options)
}

/// Load delimited data from any reader.
pub fn load_csv_from_reader<R: Read>(reader: R, options: &CsvOptions) -> LoadResult<Dataset> {
    load_named(reader, Path::new("<reader>"), options)
}

fn load_named<R: Read>(reader: R, origin: &Path, options: &CsvOptions) -> LoadResult<Dataset> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(false)
        .delimiter(options.delimiter)
        .quote(options.quote)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    if headers.is_empty() {
        return Err(LoadError::MalformedInput {
            path: origin.to_path_buf(),
            message: "file is empty (no header row)".to_string(),
        });
    }

    let mut values: Vec<Vec<Option<String>>> = vec![Vec::new(); headers.len()];
    let mut lines = Vec::new();
    for result in rdr.records() {
        let record = result?;
        let line = record
            .position()
            .map_or(lines.len() as u64 + 2, |p| p.line());
        lines.push(line);
        for (slot, raw) in values.iter_mut().zip(record.iter()) {
            slot.push((!options.missing.is_missing(raw)).then(|| raw.to_owned()));
        }
    }

    let columns = headers
        .iter()
        .zip(values)
        .map(|(header, cells)| Column::new(header, cells))
        .collect();

    Dataset::with_lines(columns, lines).ok_or_else(|| LoadError::MalformedInput {
        path: origin.to_path_buf(),
        message: "columns have unequal lengths".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::{CsvOptions, MissingValues, normalize_delimiter};
    use crate::error::ErrorKind;

    #[test]
    fn single_character_delimiters_pass_through() {
        assert_eq!(normalize_delimiter(",", b'"').unwrap(), b',');
        assert_eq!(normalize_delimiter(";", b'"').unwrap(), b';');
        assert_eq!(normalize_delimiter("\t", b'"').unwrap(), b'\t');
    }

    #[test]
    fn quote_wrapped_delimiter_is_normalized() {
        assert_eq!(normalize_delimiter("\",\"", b'"').unwrap(), b',');
        assert_eq!(normalize_delimiter("';'", b'\'').unwrap(), b';');
    }

    #[test]
    fn other_multi_character_delimiters_are_rejected() {
        let err = normalize_delimiter("::", b'"').unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
        assert!(normalize_delimiter("", b'"').is_err());
        assert!(normalize_delimiter("§", b'"').is_err());
    }

    #[test]
    fn delimiter_and_quote_must_differ() {
        let err = CsvOptions::from_config("\"", '"', MissingValues::default()).unwrap_err();
        assert!(err.to_string().contains("must differ"));
    }

    #[test]
    fn missing_values_trim_and_match_tokens() {
        let missing = MissingValues::default();
        assert!(missing.is_missing(""));
        assert!(missing.is_missing("   "));
        assert!(missing.is_missing(" NA "));
        assert!(missing.is_missing("NaN"));
        assert!(!missing.is_missing("0"));
        assert!(!missing.is_missing("Namibia"));

        let strict = MissingValues::empty_only();
        assert!(strict.is_missing(""));
        assert!(!strict.is_missing("NA"));
    }
}
