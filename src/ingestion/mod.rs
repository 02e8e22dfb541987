//! Loading delimited files and observing load jobs.
//!
//! - [`csv`]: parse a delimited file into a raw, columnar [`crate::types::Dataset`]
//! - [`observability`]: observer hooks reporting progress, generated SQL and failures

pub mod csv;
pub mod observability;

pub use self::csv::{
    CsvOptions, DEFAULT_MISSING_VALUES, MissingValues, load_csv_from_path, load_csv_from_reader,
    normalize_delimiter,
};
pub use observability::{
    CompositeObserver, FileObserver, LoadContext, LoadObserver, LoadSeverity, LoadStats,
    StatementKind, StdErrObserver, TracingObserver, render_preview,
};
