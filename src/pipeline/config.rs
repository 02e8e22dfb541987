//! Run configuration: per-file jobs plus shared connection parameters.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::database::ConnectionParams;
use crate::error::{LoadError, LoadResult};
use crate::ingestion::{CsvOptions, MissingValues};
use crate::schema::validate_table_name;

/// One file to load into one table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadJob {
    /// Input file.
    pub path: PathBuf,
    /// Destination table.
    pub table: String,
    /// Field delimiter; see [`crate::ingestion::normalize_delimiter`].
    #[serde(default = "default_delimiter")]
    pub delimiter: String,
    /// Quote character.
    #[serde(default = "default_quote")]
    pub quote: char,
}

fn default_delimiter() -> String {
    ",".to_string()
}

fn default_quote() -> char {
    '"'
}

impl LoadJob {
    /// A job with the default `"` quote character.
    pub fn new(
        path: impl Into<PathBuf>,
        table: impl Into<String>,
        delimiter: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            table: table.into(),
            delimiter: delimiter.into(),
            quote: default_quote(),
        }
    }

    /// Reader options for this job.
    pub fn csv_options(&self, missing: &MissingValues) -> LoadResult<CsvOptions> {
        CsvOptions::from_config(&self.delimiter, self.quote, missing.clone())
    }

    /// Check the table name and the delimiter/quote pair.
    pub fn validate(&self) -> LoadResult<()> {
        validate_table_name(&self.table)?;
        self.csv_options(&MissingValues::empty_only()).map(|_| ())
    }
}

/// What the driver does after a job fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Record the failure and continue with the next job.
    #[default]
    Continue,
    /// Stop the run at the first failure.
    Abort,
}

/// A full run description, usually read from a JSON file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadConfig {
    /// PostgreSQL connection; optional when the target is chosen elsewhere (e.g. SQLite).
    #[serde(default)]
    pub connection: Option<ConnectionParams>,
    #[serde(default)]
    pub failure_policy: FailurePolicy,
    #[serde(default)]
    pub missing_values: MissingValues,
    pub jobs: Vec<LoadJob>,
}

impl LoadConfig {
    /// Read and validate a JSON config file.
    pub fn from_path(path: impl AsRef<Path>) -> LoadResult<Self> {
        let text = fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&text).map_err(|e| match e {
            LoadError::Config { message } => LoadError::Config {
                message: format!("{}: {message}", path.as_ref().display()),
            },
            other => other,
        })
    }

    /// Parse and validate a JSON config.
    pub fn from_json_str(input: &str) -> LoadResult<Self> {
        let config: LoadConfig = serde_json::from_str(input)
            .map_err(|e| LoadError::config(format!("invalid json config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate every job. An empty job list is an error.
    pub fn validate(&self) -> LoadResult<()> {
        if self.jobs.is_empty() {
            return Err(LoadError::config("no jobs configured"));
        }
        for job in &self.jobs {
            job.validate().map_err(|e| match e {
                LoadError::Config { message } => LoadError::Config {
                    message: format!("job for {}: {message}", job.path.display()),
                },
                other => other,
            })?;
        }
        Ok(())
    }
}

/// The five indicator datasets, read from `input_dir`.
pub fn default_jobs(input_dir: impl AsRef<Path>) -> Vec<LoadJob> {
    let dir = input_dir.as_ref();
    [
        ("Democracy_Index_2006_2023.csv", "Democracy_Index", ","),
        ("Population.csv", "Population", "\",\""),
        ("Press_Freedom.csv", "Press_Freedom", ";"),
        ("Life_expectancy.csv", "Life_Expectancy", "\",\""),
        ("Education.csv", "Education", ","),
    ]
    .into_iter()
    .map(|(file, table, delimiter)| LoadJob::new(dir.join(file), table, delimiter))
    .collect()
}
