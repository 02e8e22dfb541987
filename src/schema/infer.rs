//! Whole-column type inference.
//!
//! Each non-missing cell is classified into a [`Shape`]; the column's type is then decided
//! from the set of shapes seen, in priority order:
//!
//! 1. [`InferredType::Integer`]: every value is an integer.
//! 2. [`InferredType::Float`]: every value is a number (integers and decimals mixed).
//! 3. [`InferredType::Timestamp`]: every value is a recognized date/time.
//! 4. [`InferredType::Text`]: every value is plain text.
//! 5. [`InferredType::Generic`]: anything else, including an all-missing column.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::types::{Dataset, InferredType};

/// Date-time layouts tried, in order, by [`parse_timestamp`].
pub const TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S%.f",
    "%Y/%m/%d %H:%M",
];

/// Date-only layouts; parsed values are placed at midnight.
pub const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];

/// Shape of a single non-missing cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Integer,
    Float,
    Timestamp,
    Text,
}

/// Classify one cell.
pub fn classify_value(raw: &str) -> Shape {
    let s = raw.trim();
    if parse_integer(s).is_some() {
        Shape::Integer
    } else if parse_float(s).is_some() {
        Shape::Float
    } else if parse_timestamp(s).is_some() {
        Shape::Timestamp
    } else {
        Shape::Text
    }
}

/// Classify a column from its full value sequence.
///
/// Missing values (`None`) are ignored. A column with no values is [`InferredType::Generic`].
pub fn infer_column_type(values: &[Option<String>]) -> InferredType {
    let mut seen_integer = false;
    let mut seen_float = false;
    let mut seen_timestamp = false;
    let mut seen_text = false;

    for raw in values.iter().flatten() {
        match classify_value(raw) {
            Shape::Integer => seen_integer = true,
            Shape::Float => seen_float = true,
            Shape::Timestamp => seen_timestamp = true,
            Shape::Text => seen_text = true,
        }
    }

    let numeric = seen_integer || seen_float;
    match (numeric, seen_timestamp, seen_text) {
        (true, false, false) if !seen_float => InferredType::Integer,
        (true, false, false) => InferredType::Float,
        (false, true, false) => InferredType::Timestamp,
        (false, false, true) => InferredType::Text,
        _ => InferredType::Generic,
    }
}

/// Infer the type of every column of `dataset`, in column order.
pub fn infer_types(dataset: &Dataset) -> Vec<InferredType> {
    dataset
        .columns()
        .iter()
        .map(|c| infer_column_type(&c.values))
        .collect()
}

/// Parse a base-10 integer: optional sign, ASCII digits only.
pub fn parse_integer(s: &str) -> Option<i64> {
    let digits = s.strip_prefix(['-', '+']).unwrap_or(s);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse::<i64>().ok()
}

/// Parse a decimal number, with optional fraction and exponent.
///
/// Spellings without digits (`inf`, `NaN`, `infinity`) are not numbers.
pub fn parse_float(s: &str) -> Option<f64> {
    let allowed = |b: u8| b.is_ascii_digit() || matches!(b, b'+' | b'-' | b'.' | b'e' | b'E');
    if !s.bytes().any(|b| b.is_ascii_digit()) || !s.bytes().all(allowed) {
        return None;
    }
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parse a date/time under one of the recognized layouts.
///
/// RFC 3339 values with an offset are normalized to UTC.
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }
    for fmt in TIMESTAMP_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return d.and_hms_opt(0, 0, 0);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::{Shape, classify_value, infer_column_type, parse_float, parse_timestamp};
    use crate::types::InferredType;

    fn col(values: &[&str]) -> Vec<Option<String>> {
        values
            .iter()
            .map(|v| (!v.is_empty()).then(|| v.to_string()))
            .collect()
    }

    #[test]
    fn all_integers_classify_as_integer() {
        assert_eq!(
            infer_column_type(&col(&["2006", "-3", "0", "331000000"])),
            InferredType::Integer
        );
        assert_eq!(infer_column_type(&col(&["+7", " 12 "])), InferredType::Integer);
    }

    #[test]
    fn one_decimal_among_integers_makes_float() {
        assert_eq!(infer_column_type(&col(&["1", "2.5", "3"])), InferredType::Float);
        assert_eq!(infer_column_type(&col(&["8.93", "1e3", "-0.5"])), InferredType::Float);
    }

    #[test]
    fn integers_beyond_i64_fall_back_to_float() {
        assert_eq!(
            infer_column_type(&col(&["1", "99999999999999999999"])),
            InferredType::Float
        );
    }

    #[test]
    fn timestamps_and_dates_classify_as_timestamp() {
        assert_eq!(
            infer_column_type(&col(&["2023-01-31", "2024-02-29 13:45:00", "2022-12-01T08:00:00Z"])),
            InferredType::Timestamp
        );
    }

    #[test]
    fn plain_words_classify_as_text() {
        assert_eq!(
            infer_column_type(&col(&["Norway", "Full democracy", "Côte d'Ivoire"])),
            InferredType::Text
        );
    }

    #[test]
    fn mixed_content_is_generic_not_text_or_integer() {
        assert_eq!(infer_column_type(&col(&["1", "two", "3"])), InferredType::Generic);
        assert_eq!(infer_column_type(&col(&["1.5", "2023-01-01"])), InferredType::Generic);
        assert_eq!(infer_column_type(&col(&["2023-01-01", "soon"])), InferredType::Generic);
    }

    #[test]
    fn missing_values_are_ignored_and_all_missing_is_generic() {
        assert_eq!(infer_column_type(&col(&["", "4", ""])), InferredType::Integer);
        assert_eq!(infer_column_type(&col(&["", "", ""])), InferredType::Generic);
        assert_eq!(infer_column_type(&[]), InferredType::Generic);
        assert_eq!(InferredType::Generic.sql_type(), "TEXT");
    }

    #[test]
    fn non_numeric_float_spellings_are_text() {
        assert_eq!(parse_float("inf"), None);
        assert_eq!(parse_float("NaN"), None);
        assert_eq!(parse_float("1.2.3"), None);
        assert_eq!(parse_float("-"), None);
        assert_eq!(classify_value("infinity"), Shape::Text);
    }

    #[test]
    fn timestamp_formats() {
        assert!(parse_timestamp("2006-01-01").is_some());
        assert!(parse_timestamp("2006/01/01 10:30").is_some());
        assert!(parse_timestamp("2006-01-01T10:30:15.250").is_some());
        assert!(parse_timestamp("2006").is_none());
        assert!(parse_timestamp("01-2006").is_none());
    }
}
