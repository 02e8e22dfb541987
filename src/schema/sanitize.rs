//! Header → column identifier sanitization.

use std::collections::HashMap;

use crate::error::{LoadError, LoadResult};

/// Keep only alphanumeric characters of `header`, preserving their order and case.
///
/// `"Life Expectancy (yrs)"` becomes `"LifeExpectancyyrs"`.
pub fn sanitize_column_name(header: &str) -> String {
    header.chars().filter(|c| c.is_alphanumeric()).collect()
}

/// Sanitize every header of a table.
///
/// Fails with [`LoadError::SanitizationAmbiguity`] if a header has no alphanumeric characters
/// or if two headers sanitize to the same identifier.
pub fn sanitize_headers<'a, I>(table: &str, headers: I) -> LoadResult<Vec<String>>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut names = Vec::new();
    let mut first_seen: HashMap<String, &'a str> = HashMap::new();

    for header in headers {
        let name = sanitize_column_name(header);
        if name.is_empty() {
            return Err(LoadError::SanitizationAmbiguity {
                table: table.to_string(),
                message: format!("header {header:?} has no alphanumeric characters"),
            });
        }
        if let Some(previous) = first_seen.insert(name.clone(), header) {
            return Err(LoadError::SanitizationAmbiguity {
                table: table.to_string(),
                message: format!(
                    "headers {previous:?} and {header:?} both sanitize to column \"{name}\""
                ),
            });
        }
        names.push(name);
    }

    Ok(names)
}
