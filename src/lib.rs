//! `csv-table-loader` loads delimited text files into relational tables.
//!
//! For every configured file it infers a schema, creates the destination table if it does not
//! exist, and inserts every row. The primary entrypoints are [`pipeline::load_table`] (one file)
//! and [`pipeline::run`] (a list of jobs).
//!
//! ## Pipeline
//!
//! 1. **Load** ([`ingestion::csv`]): parse the file with a configurable delimiter and quote
//!    character into a columnar [`types::Dataset`] of raw text cells.
//! 2. **Infer** ([`schema::infer`]): classify each column as Integer, Float, Timestamp, Text or
//!    Generic from its whole value sequence.
//! 3. **Sanitize** ([`schema::sanitize`]): strip every non-alphanumeric character from headers.
//! 4. **Create** ([`schema::sql`]): `CREATE TABLE IF NOT EXISTS <table> ("<col>" <TYPE>, ...)`.
//! 5. **Insert**: one parameterized `INSERT` executed per row, then committed.
//!
//! Storage types are fixed:
//!
//! | Inferred | SQL |
//! |---|---|
//! | Integer | `INT` |
//! | Float | `FLOAT` |
//! | Timestamp | `TIMESTAMP` |
//! | Text | `VARCHAR` |
//! | Generic | `TEXT` |
//!
//! ## Quick example: plan a load without a database
//!
//! ```no_run
//! use csv_table_loader::pipeline::{LoadJob, LoadOptions, plan_table};
//!
//! # fn main() -> Result<(), csv_table_loader::LoadError> {
//! let job = LoadJob::new("Input_Dataset/Population.csv", "Population", "\",\"");
//! let plan = plan_table(&job, &LoadOptions::default())?;
//! println!("{}", plan.create_sql);
//! println!("{}", plan.insert_sql(|i| format!("${i}")));
//! # Ok(())
//! # }
//! ```
//!
//! ## Loading into SQLite
//!
//! ```no_run
//! use csv_table_loader::database::SqliteConnector;
//! use csv_table_loader::pipeline::{LoadJob, LoadOptions, load_table};
//!
//! # fn main() -> Result<(), csv_table_loader::LoadError> {
//! let connector = SqliteConnector::new("indicators.db");
//! let job = LoadJob::new("Input_Dataset/Press_Freedom.csv", "Press_Freedom", ";");
//! let stats = load_table(&connector, &job, &LoadOptions::default())?;
//! println!("rows={}", stats.rows);
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`ingestion`]: delimited-file loading and load observers
//! - [`schema`]: type inference, name sanitization and statement builders
//! - [`database`]: connectors and sessions (PostgreSQL, SQLite)
//! - [`pipeline`]: per-file pipeline, multi-file driver and run configuration
//! - [`types`]: dataset and table description types
//! - [`error`]: error type shared by all stages

pub mod database;
pub mod error;
pub mod ingestion;
pub mod pipeline;
pub mod schema;
pub mod types;

pub use error::{ErrorKind, LoadError, LoadResult};
