use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use csv_table_loader::database::{ConnectionParams, PostgresConnector, SqliteConnector};
use csv_table_loader::ingestion::{
    CompositeObserver, FileObserver, LoadObserver, StdErrObserver, TracingObserver,
};
use csv_table_loader::pipeline::{
    self, FailurePolicy, LoadConfig, LoadOptions, default_jobs, plan_table,
};

#[derive(Parser)]
#[command(name = "csv-table-loader")]
#[command(about = "Load delimited indicator files into database tables")]
struct Args {
    /// JSON run configuration (jobs, connection, failure policy)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory with the indicator CSV files, used when no config is given
    #[arg(short, long, default_value = "Input_Dataset")]
    input_dir: PathBuf,

    /// PostgreSQL host (default: localhost)
    #[arg(long)]
    host: Option<String>,

    /// PostgreSQL port (default: 5432)
    #[arg(long)]
    port: Option<u16>,

    /// Database name
    #[arg(long)]
    dbname: Option<String>,

    /// Database user
    #[arg(long)]
    user: Option<String>,

    /// Database password
    #[arg(long, env = "PGPASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Load into this SQLite database file instead of PostgreSQL
    #[arg(long)]
    sqlite: Option<PathBuf>,

    /// Stop at the first failed file
    #[arg(long)]
    fail_fast: bool,

    /// Parse and infer only; print the generated statements
    #[arg(long)]
    dry_run: bool,

    /// Also append load events to this file
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Print the first rows of each parsed file and its statements to stderr
    #[arg(long)]
    preview: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    match execute(&args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            error!("{e:#}");
            ExitCode::from(2)
        }
    }
}

fn execute(args: &Args) -> Result<bool> {
    let config = match &args.config {
        Some(path) => LoadConfig::from_path(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => LoadConfig {
            connection: None,
            failure_policy: FailurePolicy::default(),
            missing_values: Default::default(),
            jobs: default_jobs(&args.input_dir),
        },
    };

    let mut options = LoadOptions::from_config(&config);
    if args.fail_fast {
        options.failure_policy = FailurePolicy::Abort;
    }
    options.observer = Some(observer(args.log_file.as_deref(), args.preview));

    if args.dry_run {
        return Ok(dry_run(&config, &options));
    }

    let report = match &args.sqlite {
        Some(path) => {
            info!(path = %path.display(), jobs = config.jobs.len(), "loading into SQLite");
            pipeline::run(&SqliteConnector::new(path), &config.jobs, &options)
        }
        None => {
            let params = connection_params(args, config.connection.clone());
            info!(database = %params.target(), jobs = config.jobs.len(), "loading into PostgreSQL");
            pipeline::run(&PostgresConnector::new(params), &config.jobs, &options)
        }
    };

    report.log_summary();
    Ok(report.is_success())
}

fn observer(log_file: Option<&Path>, preview: bool) -> Arc<dyn LoadObserver> {
    let mut observers: Vec<Arc<dyn LoadObserver>> = vec![Arc::new(TracingObserver)];
    if let Some(path) = log_file {
        observers.push(Arc::new(FileObserver::new(path)));
    }
    if preview {
        observers.push(Arc::new(StdErrObserver));
    }
    if observers.len() == 1 {
        return Arc::new(TracingObserver);
    }
    Arc::new(CompositeObserver::new(observers))
}

/// Command-line flags override the config file's connection section.
fn connection_params(args: &Args, from_config: Option<ConnectionParams>) -> ConnectionParams {
    let mut params = from_config
        .unwrap_or_else(|| ConnectionParams::new("Democracy_Index_Portfolio", "postgres"));
    if let Some(host) = &args.host {
        params.host = host.clone();
    }
    if let Some(port) = args.port {
        params.port = port;
    }
    if let Some(dbname) = &args.dbname {
        params.dbname = dbname.clone();
    }
    if let Some(user) = &args.user {
        params.user = user.clone();
    }
    if args.password.is_some() {
        params.password = args.password.clone();
    }
    params
}

fn dry_run(config: &LoadConfig, options: &LoadOptions) -> bool {
    let mut ok = true;
    for job in &config.jobs {
        match plan_table(job, options) {
            Ok(plan) => {
                println!("-- {} ({} rows)", job.path.display(), plan.dataset.row_count());
                println!("{};", plan.create_sql);
                println!("{};", plan.insert_sql(|i| format!("${i}")));
            }
            Err(e) => {
                error!(table = %job.table, path = %job.path.display(), "{e}");
                ok = false;
                if options.failure_policy == FailurePolicy::Abort {
                    break;
                }
            }
        }
    }
    ok
}
