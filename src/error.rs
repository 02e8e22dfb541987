use std::path::{Path, PathBuf};

use thiserror::Error;

/// Convenience result type for loader operations.
pub type LoadResult<T> = Result<T, LoadError>;

/// Boxed error returned by database drivers.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Error type returned by every stage of the load pipeline.
///
/// This is a single error enum shared by the loader, the schema builder and the
/// database sessions. Use [`LoadError::kind`] to get the coarse category.
#[derive(Debug, Error)]
pub enum LoadError {
    /// Underlying I/O error (e.g. file not found, permission denied).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The tokenizer rejected the input (bad quoting, unequal field counts, ...).
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// The input file is structurally unusable (empty, no header row, ...).
    #[error("malformed input '{}': {message}", path.display())]
    MalformedInput { path: PathBuf, message: String },

    /// A value could not be converted into its column's [`crate::types::InferredType`].
    #[error("failed to parse value at row {row} column '{column}': {message} (raw='{raw}')")]
    ParseError {
        row: usize,
        column: String,
        raw: String,
        message: String,
    },

    /// A header sanitized to an empty identifier, or two headers collided.
    #[error("cannot derive a column name for table '{table}': {message}")]
    SanitizationAmbiguity { table: String, message: String },

    /// A database session could not be established.
    #[error("failed to connect to {target}: {source}")]
    Connection {
        target: String,
        #[source]
        source: BoxError,
    },

    /// The server rejected a generated statement.
    #[error("statement rejected for table '{table}': {source}\n  statement: {statement}")]
    Statement {
        table: String,
        statement: String,
        #[source]
        source: BoxError,
    },

    /// Invalid job or connection configuration.
    #[error("invalid configuration: {message}")]
    Config { message: String },

    /// A read or parse failure, tagged with the job it happened in.
    #[error("table '{table}' from '{}': {source}", path.display())]
    Job {
        table: String,
        path: PathBuf,
        #[source]
        source: Box<LoadError>,
    },
}

/// Coarse error category, one per failure class of the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Unreadable or malformed input file.
    Parse,
    /// Session establishment failure.
    Connection,
    /// Generated SQL rejected by the server.
    Statement,
    /// Header sanitizes to an empty or duplicate identifier.
    SanitizationAmbiguity,
    /// Bad configuration, detected before any work starts.
    Config,
}

impl LoadError {
    /// Category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            LoadError::Io(_)
            | LoadError::Csv(_)
            | LoadError::MalformedInput { .. }
            | LoadError::ParseError { .. } => ErrorKind::Parse,
            LoadError::Connection { .. } => ErrorKind::Connection,
            LoadError::Statement { .. } => ErrorKind::Statement,
            LoadError::SanitizationAmbiguity { .. } => ErrorKind::SanitizationAmbiguity,
            LoadError::Config { .. } => ErrorKind::Config,
            LoadError::Job { source, .. } => source.kind(),
        }
    }

    /// The innermost error, looking through [`LoadError::Job`].
    pub fn root(&self) -> &LoadError {
        match self {
            LoadError::Job { source, .. } => source.root(),
            other => other,
        }
    }

    /// Tag an error that names neither table nor file with the job's table and path.
    ///
    /// Errors that already carry that context are returned unchanged.
    pub fn in_job(self, table: &str, path: &Path) -> Self {
        if !matches!(
            self,
            LoadError::Io(_) | LoadError::Csv(_) | LoadError::ParseError { .. }
        ) {
            return self;
        }
        LoadError::Job {
            table: table.to_string(),
            path: path.to_path_buf(),
            source: Box::new(self),
        }
    }

    pub(crate) fn config(message: impl Into<String>) -> Self {
        LoadError::Config {
            message: message.into(),
        }
    }
}
