//! The per-file load pipeline and the multi-file driver.
//!
//! For one [`LoadJob`], [`load_table`]:
//!
//! 1. loads the file into a raw [`Dataset`]
//! 2. sanitizes headers and infers column types into a [`TableSpec`]
//! 3. opens a session, runs `CREATE TABLE IF NOT EXISTS` and commits
//! 4. runs one parameterized `INSERT` per row and commits
//! 5. closes the session
//!
//! [`run`] repeats this for a list of jobs, isolating failures according to
//! [`FailurePolicy`].
//!
//! ```no_run
//! use csv_table_loader::database::{ConnectionParams, PostgresConnector};
//! use csv_table_loader::pipeline::{LoadOptions, default_jobs, run};
//!
//! let params = ConnectionParams::new("Democracy_Index_Portfolio", "postgres");
//! let connector = PostgresConnector::new(params);
//! let report = run(&connector, &default_jobs("Input_Dataset"), &LoadOptions::default());
//! println!("{} rows loaded", report.rows_loaded());
//! ```

pub mod config;

use std::fmt;
use std::sync::Arc;

use crate::database::{Connector, Session, with_session};
use crate::error::{LoadError, LoadResult};
use crate::ingestion::{
    LoadContext, LoadObserver, LoadSeverity, LoadStats, MissingValues, StatementKind,
    load_csv_from_path,
};
use crate::schema::{
    create_table_statement, insert_statement, table_spec, typed_rows, validate_table_name,
};
use crate::types::{Dataset, TableSpec};

pub use config::{FailurePolicy, LoadConfig, LoadJob, default_jobs};

/// Options shared by every job of a run.
///
/// Use [`Default`] for common cases.
#[derive(Clone)]
pub struct LoadOptions {
    /// Cells treated as missing.
    pub missing: MissingValues,
    /// What [`run`] does after a job fails.
    pub failure_policy: FailurePolicy,
    /// Optional observer for logging/alerts.
    pub observer: Option<Arc<dyn LoadObserver>>,
    /// Severity threshold at which `on_alert` is invoked.
    pub alert_at_or_above: LoadSeverity,
}

impl fmt::Debug for LoadOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadOptions")
            .field("missing", &self.missing)
            .field("failure_policy", &self.failure_policy)
            .field("observer_set", &self.observer.is_some())
            .field("alert_at_or_above", &self.alert_at_or_above)
            .finish()
    }
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            missing: MissingValues::default(),
            failure_policy: FailurePolicy::default(),
            observer: None,
            alert_at_or_above: LoadSeverity::Critical,
        }
    }
}

impl LoadOptions {
    /// Options taking missing values and failure policy from a [`LoadConfig`].
    pub fn from_config(config: &LoadConfig) -> Self {
        Self {
            missing: config.missing_values.clone(),
            failure_policy: config.failure_policy,
            ..Default::default()
        }
    }

    fn emit(&self, f: impl FnOnce(&dyn LoadObserver)) {
        if let Some(obs) = self.observer.as_deref() {
            f(obs);
        }
    }
}

/// Everything known about a job before a database is involved.
#[derive(Debug, Clone)]
pub struct LoadPlan {
    /// Raw cells as loaded.
    pub dataset: Dataset,
    /// Sanitized names and inferred types.
    pub spec: TableSpec,
    /// The `CREATE TABLE IF NOT EXISTS` statement.
    pub create_sql: String,
}

impl LoadPlan {
    /// The insert statement with placeholders produced by `placeholder`.
    pub fn insert_sql(&self, placeholder: impl Fn(usize) -> String) -> String {
        insert_statement(&self.spec, placeholder)
    }
}

/// Load, sanitize and infer without touching a database.
pub fn plan_table(job: &LoadJob, options: &LoadOptions) -> LoadResult<LoadPlan> {
    validate_table_name(&job.table)?;
    let csv_options = job.csv_options(&options.missing)?;
    let dataset = load_csv_from_path(&job.path, &csv_options)
        .map_err(|e| e.in_job(&job.table, &job.path))?;

    let ctx = context(job);
    options.emit(|obs| obs.on_loaded(&ctx, &dataset));

    let spec = table_spec(&job.table, &dataset)?;
    let create_sql = create_table_statement(&spec);
    Ok(LoadPlan {
        dataset,
        spec,
        create_sql,
    })
}

/// Run the full pipeline for one job against a fresh session from `connector`.
///
/// When an observer is configured, this function reports:
///
/// - `on_loaded` after parsing, `on_statement` before each statement runs
/// - `on_success` on success, with row/column stats
/// - `on_failure` on failure, with a computed severity
/// - `on_alert` on failure when the severity is >= `options.alert_at_or_above`
pub fn load_table<C: Connector>(
    connector: &C,
    job: &LoadJob,
    options: &LoadOptions,
) -> LoadResult<LoadStats> {
    let ctx = context(job);
    let result = execute_job(connector, job, options, &ctx);

    match &result {
        Ok(stats) => options.emit(|obs| obs.on_success(&ctx, *stats)),
        Err(e) => {
            let severity = LoadSeverity::for_error(e);
            options.emit(|obs| {
                obs.on_failure(&ctx, severity, e);
                if severity >= options.alert_at_or_above {
                    obs.on_alert(&ctx, severity, e);
                }
            });
        }
    }

    result
}

fn execute_job<C: Connector>(
    connector: &C,
    job: &LoadJob,
    options: &LoadOptions,
    ctx: &LoadContext,
) -> LoadResult<LoadStats> {
    let plan = plan_table(job, options)?;
    let column_types = plan.spec.column_types();
    let rows = typed_rows(&plan.dataset, &column_types)
        .map_err(|e| e.in_job(&job.table, &job.path))?;
    let table = plan.spec.table.as_str();

    with_session(connector, |session| {
        options.emit(|obs| obs.on_statement(ctx, StatementKind::CreateTable, &plan.create_sql));
        session
            .execute_and_commit(&plan.create_sql)
            .map_err(|source| statement_error(table, &plan.create_sql, source))?;

        let insert_sql = plan.insert_sql(|i| session.placeholder(i));
        options.emit(|obs| obs.on_statement(ctx, StatementKind::Insert, &insert_sql));
        let inserted = session
            .insert_and_commit(&insert_sql, &column_types, &rows)
            .map_err(|source| statement_error(table, &insert_sql, source))?;

        Ok(LoadStats {
            rows: inserted as usize,
            columns: plan.spec.columns.len(),
        })
    })
}

fn statement_error(table: &str, statement: &str, source: crate::error::BoxError) -> LoadError {
    LoadError::Statement {
        table: table.to_string(),
        statement: statement.to_string(),
        source,
    }
}

fn context(job: &LoadJob) -> LoadContext {
    LoadContext {
        path: job.path.clone(),
        table: job.table.clone(),
    }
}

/// Result of one attempted job.
#[derive(Debug)]
pub struct JobOutcome {
    pub job: LoadJob,
    pub result: LoadResult<LoadStats>,
}

/// Outcome of a multi-file run.
#[derive(Debug, Default)]
pub struct RunReport {
    /// One entry per attempted job, in job order.
    pub outcomes: Vec<JobOutcome>,
    /// Jobs not attempted because the run was aborted.
    pub skipped: Vec<LoadJob>,
}

impl RunReport {
    /// `true` if every job was attempted and succeeded.
    pub fn is_success(&self) -> bool {
        self.skipped.is_empty() && self.outcomes.iter().all(|o| o.result.is_ok())
    }

    /// Attempted jobs that failed.
    pub fn failures(&self) -> impl Iterator<Item = (&LoadJob, &LoadError)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().err().map(|e| (&o.job, e)))
    }

    /// Total rows inserted across successful jobs.
    pub fn rows_loaded(&self) -> usize {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().ok())
            .map(|s| s.rows)
            .sum()
    }

    /// Log the run totals and any skipped jobs.
    ///
    /// Per-job outcomes are reported by the configured observer and are not repeated here.
    pub fn log_summary(&self) {
        for job in &self.skipped {
            tracing::warn!(table = %job.table, "skipped after earlier failure");
        }
        tracing::info!(
            rows = self.rows_loaded(),
            failed = self.failures().count(),
            skipped = self.skipped.len(),
            "run finished"
        );
    }

    /// Per-job stats, or the first failure.
    pub fn into_result(self) -> LoadResult<Vec<LoadStats>> {
        self.outcomes.into_iter().map(|o| o.result).collect()
    }
}

/// Run every job in order, one session per job.
///
/// With [`FailurePolicy::Continue`] a failed job is recorded and the next job runs; with
/// [`FailurePolicy::Abort`] the remaining jobs are listed in [`RunReport::skipped`].
pub fn run<C: Connector>(connector: &C, jobs: &[LoadJob], options: &LoadOptions) -> RunReport {
    let mut report = RunReport::default();
    for (idx, job) in jobs.iter().enumerate() {
        let result = load_table(connector, job, options);
        let failed = result.is_err();
        report.outcomes.push(JobOutcome {
            job: job.clone(),
            result,
        });
        if failed && options.failure_policy == FailurePolicy::Abort {
            report.skipped = jobs[idx + 1..].to_vec();
            break;
        }
    }
    report
}
