use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use chrono::Utc;

use crate::error::{ErrorKind, LoadError};
use crate::types::Dataset;

/// Number of rows printed by preview-style observers.
pub const PREVIEW_ROWS: usize = 5;

/// Severity classification used for observer callbacks and alerting thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LoadSeverity {
    /// Informational event.
    Info,
    /// Warning-level event (non-fatal).
    Warning,
    /// Error-level event (the job failed).
    Error,
    /// Critical error (unreadable files, unreachable database).
    Critical,
}

impl LoadSeverity {
    /// Severity assigned to a failed job.
    pub fn for_error(error: &LoadError) -> Self {
        match error.root() {
            LoadError::Io(_) => LoadSeverity::Critical,
            LoadError::Csv(err) => match err.kind() {
                csv::ErrorKind::Io(_) => LoadSeverity::Critical,
                _ => LoadSeverity::Error,
            },
            root if root.kind() == ErrorKind::Connection => LoadSeverity::Critical,
            _ => LoadSeverity::Error,
        }
    }
}

/// Which generated statement an [`LoadObserver::on_statement`] call refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    /// `CREATE TABLE IF NOT EXISTS ...`
    CreateTable,
    /// `INSERT INTO ... VALUES (...)`
    Insert,
}

/// Context about one load job.
#[derive(Debug, Clone)]
pub struct LoadContext {
    /// The input file.
    pub path: PathBuf,
    /// Destination table.
    pub table: String,
}

/// Stats reported on a successful load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadStats {
    /// Rows inserted.
    pub rows: usize,
    /// Columns in the destination table.
    pub columns: usize,
}

/// Observer interface for load progress and outcomes.
///
/// Implementors can record metrics, logs, or trigger alerts.
pub trait LoadObserver: Send + Sync {
    /// Called once the file has been parsed.
    fn on_loaded(&self, _ctx: &LoadContext, _dataset: &Dataset) {}

    /// Called with each generated statement before it is executed.
    fn on_statement(&self, _ctx: &LoadContext, _kind: StatementKind, _sql: &str) {}

    /// Called when the job succeeds.
    fn on_success(&self, _ctx: &LoadContext, _stats: LoadStats) {}

    /// Called when the job fails.
    fn on_failure(&self, _ctx: &LoadContext, _severity: LoadSeverity, _error: &LoadError) {}

    /// Called when a failure meets the alert threshold.
    ///
    /// Default behavior forwards to [`Self::on_failure`].
    fn on_alert(&self, ctx: &LoadContext, severity: LoadSeverity, error: &LoadError) {
        self.on_failure(ctx, severity, error)
    }
}

/// An observer that fans out callbacks to a list of observers.
#[derive(Default)]
pub struct CompositeObserver {
    observers: Vec<Arc<dyn LoadObserver>>,
}

impl CompositeObserver {
    /// Create a new composite observer from a list of observers.
    pub fn new(observers: Vec<Arc<dyn LoadObserver>>) -> Self {
        Self { observers }
    }
}

impl fmt::Debug for CompositeObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeObserver")
            .field("observers_len", &self.observers.len())
            .finish()
    }
}

impl LoadObserver for CompositeObserver {
    fn on_loaded(&self, ctx: &LoadContext, dataset: &Dataset) {
        for o in &self.observers {
            o.on_loaded(ctx, dataset);
        }
    }

    fn on_statement(&self, ctx: &LoadContext, kind: StatementKind, sql: &str) {
        for o in &self.observers {
            o.on_statement(ctx, kind, sql);
        }
    }

    fn on_success(&self, ctx: &LoadContext, stats: LoadStats) {
        for o in &self.observers {
            o.on_success(ctx, stats);
        }
    }

    fn on_failure(&self, ctx: &LoadContext, severity: LoadSeverity, error: &LoadError) {
        for o in &self.observers {
            o.on_failure(ctx, severity, error);
        }
    }

    fn on_alert(&self, ctx: &LoadContext, severity: LoadSeverity, error: &LoadError) {
        for o in &self.observers {
            o.on_alert(ctx, severity, error);
        }
    }
}

/// Prints a dataset preview, the generated statements and outcomes to stderr.
#[derive(Debug, Default)]
pub struct StdErrObserver;

impl LoadObserver for StdErrObserver {
    fn on_loaded(&self, ctx: &LoadContext, dataset: &Dataset) {
        eprintln!(
            "[load][parsed] table={} path={} rows={} columns={}",
            ctx.table,
            ctx.path.display(),
            dataset.row_count(),
            dataset.column_count()
        );
        eprintln!("{}", render_preview(dataset, PREVIEW_ROWS));
    }

    fn on_statement(&self, ctx: &LoadContext, kind: StatementKind, sql: &str) {
        eprintln!("[load][{kind:?}] table={} sql={sql}", ctx.table);
    }

    fn on_success(&self, ctx: &LoadContext, stats: LoadStats) {
        eprintln!(
            "[load][ok] table={} path={} rows={} columns={}",
            ctx.table,
            ctx.path.display(),
            stats.rows,
            stats.columns
        );
    }

    fn on_failure(&self, ctx: &LoadContext, severity: LoadSeverity, error: &LoadError) {
        eprintln!(
            "[load][{:?}] table={} path={} err={}",
            severity,
            ctx.table,
            ctx.path.display(),
            error
        );
    }

    fn on_alert(&self, ctx: &LoadContext, severity: LoadSeverity, error: &LoadError) {
        eprintln!(
            "[ALERT][load][{:?}] table={} path={} err={}",
            severity,
            ctx.table,
            ctx.path.display(),
            error
        );
    }
}

/// Emits load events through `tracing`.
#[derive(Debug, Default)]
pub struct TracingObserver;

impl LoadObserver for TracingObserver {
    fn on_loaded(&self, ctx: &LoadContext, dataset: &Dataset) {
        tracing::info!(
            table = %ctx.table,
            path = %ctx.path.display(),
            rows = dataset.row_count(),
            columns = dataset.column_count(),
            "parsed input file"
        );
        tracing::debug!(table = %ctx.table, "preview:\n{}", render_preview(dataset, PREVIEW_ROWS));
    }

    fn on_statement(&self, ctx: &LoadContext, kind: StatementKind, sql: &str) {
        tracing::debug!(table = %ctx.table, ?kind, %sql, "generated statement");
    }

    fn on_success(&self, ctx: &LoadContext, stats: LoadStats) {
        tracing::info!(
            table = %ctx.table,
            rows = stats.rows,
            columns = stats.columns,
            "table loaded"
        );
    }

    fn on_failure(&self, ctx: &LoadContext, severity: LoadSeverity, error: &LoadError) {
        tracing::error!(
            table = %ctx.table,
            path = %ctx.path.display(),
            ?severity,
            %error,
            "load failed"
        );
    }

    fn on_alert(&self, ctx: &LoadContext, severity: LoadSeverity, _error: &LoadError) {
        // The error itself was already reported by `on_failure`.
        tracing::warn!(alert = true, table = %ctx.table, ?severity, "alert threshold reached");
    }
}

/// Appends load events to a local log file.
#[derive(Debug)]
pub struct FileObserver {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileObserver {
    /// Create a file observer that appends events to `path`.
    ///
    /// Writes are best-effort; failures to open/write the log file are ignored.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lock: Mutex::new(()),
        }
    }

    fn append_line(&self, line: &str) {
        let _guard = self.lock.lock().ok();
        if let Ok(mut f) = OpenOptions::new().create(true).append(true).open(&self.path) {
            let _ = writeln!(f, "{} {line}", Utc::now().to_rfc3339());
        }
    }
}

impl LoadObserver for FileObserver {
    fn on_statement(&self, ctx: &LoadContext, kind: StatementKind, sql: &str) {
        self.append_line(&format!("statement kind={kind:?} table={} sql={sql}", ctx.table));
    }

    fn on_success(&self, ctx: &LoadContext, stats: LoadStats) {
        self.append_line(&format!(
            "ok table={} path={} rows={} columns={}",
            ctx.table,
            ctx.path.display(),
            stats.rows,
            stats.columns
        ));
    }

    fn on_failure(&self, ctx: &LoadContext, severity: LoadSeverity, error: &LoadError) {
        self.append_line(&format!(
            "fail severity={:?} table={} path={} err={}",
            severity,
            ctx.table,
            ctx.path.display(),
            error
        ));
    }

    fn on_alert(&self, ctx: &LoadContext, severity: LoadSeverity, error: &LoadError) {
        self.append_line(&format!(
            "ALERT severity={:?} table={} path={} err={}",
            severity,
            ctx.table,
            ctx.path.display(),
            error
        ));
    }
}

/// Render the first `n` rows as a tab-separated table with a header line.
pub fn render_preview(dataset: &Dataset, n: usize) -> String {
    let mut out = dataset.headers().collect::<Vec<_>>().join("\t");
    for row in dataset.head(n) {
        out.push('\n');
        let cells: Vec<&str> = row.iter().map(|c| c.unwrap_or("<missing>")).collect();
        out.push_str(&cells.join("\t"));
    }
    out
}
