// src/logging.rs

use color_eyre::eyre::{Result, WrapErr};
use directories::ProjectDirs;
use lazy_static::lazy_static;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tracing_error::ErrorLayer;
use tracing_subscriber::{fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

lazy_static! {
    pub static ref PROJECT_NAME: String = env!("CARGO_CRATE_NAME").to_uppercase();
    pub static ref LOG_ENV: String = format!("{}_LOGLEVEL", *PROJECT_NAME);
    pub static ref LOG_FILE: String = format!("{}.log", env!("CARGO_PKG_NAME"));
    static ref DEFAULT_FILTER: String = format!("{}=info", env!("CARGO_CRATE_NAME"));
}

fn project_directory() -> Option<ProjectDirs> {
    ProjectDirs::from("io", "vanguard-recon", env!("CARGO_PKG_NAME"))
}

/// Directory for logs, reports, exports and payload files.
pub fn get_data_dir() -> PathBuf {
    project_directory()
        .map(|dirs| dirs.data_local_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from(".").join(".data"))
}

/// Directory holding `config.toml`.
pub fn get_config_dir() -> PathBuf {
    project_directory()
        .map(|dirs| dirs.config_local_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from(".").join(".config"))
}

/// Moves the previous run's log aside so one earlier session stays readable.
fn rotate_previous_log(path: &Path) -> std::io::Result<()> {
    if path.exists() {
        fs::rename(path, path.with_extension("log.old"))?;
    }
    Ok(())
}

/// Initializes file-based logging using the tracing subscriber.
///
/// The terminal belongs to the UI, so nothing is written to stdout/stderr.
/// The filter comes from `RUST_LOG`, then `<CRATE>_LOGLEVEL`, then defaults
/// to `info` for this crate. Scan spans log their close events with timings.
pub fn initialize_logging() -> Result<()> {
    let directory = get_data_dir();
    fs::create_dir_all(&directory)
        .wrap_err_with(|| format!("cannot create data directory {}", directory.display()))?;

    let log_path = directory.join(LOG_FILE.as_str());
    rotate_previous_log(&log_path)?;
    let log_file = File::create(&log_path)?;

    let filter = std::env::var("RUST_LOG")
        .or_else(|_| std::env::var(LOG_ENV.as_str()))
        .unwrap_or_else(|_| DEFAULT_FILTER.clone());

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(log_file)
        .with_ansi(false)
        .with_target(false)
        .with_thread_ids(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_filter(EnvFilter::new(filter));

    tracing_subscriber::registry()
        .with(file_layer)
        .with(ErrorLayer::default())
        .init();

    Ok(())
}
