#![cfg(feature = "sqlite")]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::io;
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use csv_table_loader::LoadError;
use csv_table_loader::database::SqliteConnector;
use csv_table_loader::ingestion::{
    FileObserver, LoadContext, LoadObserver, LoadSeverity, LoadStats, StatementKind,
    TracingObserver,
};
use csv_table_loader::pipeline::{LoadJob, LoadOptions, load_table, run};
use csv_table_loader::types::Dataset;

#[derive(Default)]
struct RecordingObserver {
    loaded_rows: Mutex<Vec<usize>>,
    statements: Mutex<Vec<(StatementKind, String)>>,
    successes: Mutex<Vec<LoadStats>>,
    failures: Mutex<Vec<LoadSeverity>>,
    alerts: Mutex<Vec<LoadSeverity>>,
}

impl LoadObserver for RecordingObserver {
    fn on_loaded(&self, _ctx: &LoadContext, dataset: &Dataset) {
        self.loaded_rows.lock().unwrap().push(dataset.row_count());
    }

    fn on_statement(&self, _ctx: &LoadContext, kind: StatementKind, sql: &str) {
        self.statements.lock().unwrap().push((kind, sql.to_string()));
    }

    fn on_success(&self, _ctx: &LoadContext, stats: LoadStats) {
        self.successes.lock().unwrap().push(stats);
    }

    fn on_failure(&self, _ctx: &LoadContext, severity: LoadSeverity, _error: &LoadError) {
        self.failures.lock().unwrap().push(severity);
    }

    fn on_alert(&self, _ctx: &LoadContext, severity: LoadSeverity, _error: &LoadError) {
        self.alerts.lock().unwrap().push(severity);
    }
}

static COUNTER: AtomicUsize = AtomicUsize::new(0);

fn tmp_file(ext: &str) -> std::path::PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let n = COUNTER.fetch_add(1, Ordering::SeqCst);
    std::env::temp_dir().join(format!(
        "csv-table-loader-obs-{}-{nanos}-{n}.{ext}",
        std::process::id()
    ))
}

fn options_with(obs: Arc<RecordingObserver>) -> LoadOptions {
    LoadOptions {
        observer: Some(obs),
        alert_at_or_above: LoadSeverity::Critical,
        ..Default::default()
    }
}

#[test]
fn observer_sees_parse_statements_and_success() {
    let obs = Arc::new(RecordingObserver::default());
    let db = tmp_file("db");
    let connector = SqliteConnector::new(&db);
    let job = LoadJob::new("tests/fixtures/democracy_index.csv", "Democracy_Index", ",");

    load_table(&connector, &job, &options_with(obs.clone())).unwrap();

    assert_eq!(*obs.loaded_rows.lock().unwrap(), vec![4]);
    let statements = obs.statements.lock().unwrap().clone();
    assert_eq!(statements.len(), 2);
    assert_eq!(statements[0].0, StatementKind::CreateTable);
    assert!(statements[0].1.starts_with("CREATE TABLE IF NOT EXISTS Democracy_Index"));
    assert_eq!(statements[1].0, StatementKind::Insert);
    assert!(statements[1].1.ends_with("VALUES (?1, ?2, ?3, ?4)"));
    assert_eq!(
        *obs.successes.lock().unwrap(),
        vec![LoadStats { rows: 4, columns: 4 }]
    );
    assert!(obs.failures.lock().unwrap().is_empty());

    let _ = std::fs::remove_file(&db);
}

#[test]
fn observer_receives_failure_and_alert_on_critical_io_error() {
    let obs = Arc::new(RecordingObserver::default());
    let connector = SqliteConnector::new(tmp_file("db"));
    let job = LoadJob::new("tests/fixtures/does_not_exist.csv", "Missing", ",");

    let _ = load_table(&connector, &job, &options_with(obs.clone())).unwrap_err();

    assert_eq!(*obs.failures.lock().unwrap(), vec![LoadSeverity::Critical]);
    assert_eq!(*obs.alerts.lock().unwrap(), vec![LoadSeverity::Critical]);
    assert!(obs.statements.lock().unwrap().is_empty());
}

#[test]
fn observer_receives_failure_without_alert_for_non_critical_error() {
    let obs = Arc::new(RecordingObserver::default());
    let csv = tmp_file("csv");
    std::fs::write(&csv, "Country,%\nChad,1\n").unwrap();
    let connector = SqliteConnector::new(tmp_file("db"));

    let _ = load_table(&connector, &LoadJob::new(&csv, "Shares", ","), &options_with(obs.clone()))
        .unwrap_err();

    assert_eq!(*obs.failures.lock().unwrap(), vec![LoadSeverity::Error]);
    assert!(obs.alerts.lock().unwrap().is_empty());

    let _ = std::fs::remove_file(&csv);
}

#[test]
fn file_observer_appends_statements_and_outcome() {
    let log = tmp_file("log");
    let db = tmp_file("db");
    let options = LoadOptions {
        observer: Some(Arc::new(FileObserver::new(&log))),
        ..Default::default()
    };
    let job = LoadJob::new("tests/fixtures/press_freedom.csv", "Press_Freedom", ";");

    load_table(&SqliteConnector::new(&db), &job, &options).unwrap();

    let text = std::fs::read_to_string(&log).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].contains("statement kind=CreateTable table=Press_Freedom"));
    assert!(lines[1].contains("statement kind=Insert"));
    assert!(lines[2].contains("ok table=Press_Freedom"));
    assert!(lines[2].contains("rows=3"));

    let _ = std::fs::remove_file(&log);
    let _ = std::fs::remove_file(&db);
}

#[derive(Clone, Default)]
struct CapturedLog(Arc<Mutex<Vec<u8>>>);

impl io::Write for CapturedLog {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn each_failure_is_logged_once_at_error_level() {
    let log = CapturedLog::default();
    let writer = log.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .finish();

    let options = LoadOptions {
        observer: Some(Arc::new(TracingObserver)),
        ..Default::default()
    };
    let jobs = vec![LoadJob::new("tests/fixtures/does_not_exist.csv", "Missing", ",")];
    tracing::subscriber::with_default(subscriber, || {
        let report = run(&SqliteConnector::new(tmp_file("db")), &jobs, &options);
        report.log_summary();
    });

    let text = String::from_utf8(log.0.lock().unwrap().clone()).unwrap();
    let errors: Vec<&str> = text.lines().filter(|l| l.contains("ERROR")).collect();
    assert_eq!(errors.len(), 1, "{text}");
    assert!(errors[0].contains("load failed"));
    assert!(text.contains("alert threshold reached"));
    assert!(text.contains("run finished"));
}
