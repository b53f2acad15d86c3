// src/core/error.rs

use std::time::Duration;
use thiserror::Error;

/// Errors surfaced by the scan engine.
///
/// Only configuration problems, network detection failures and connectivity
/// failures against the primary target ever reach a caller. Per-probe and
/// per-host failures are recovered where they happen.
#[derive(Debug, Error)]
pub enum ScanError {
    /// Invalid target URL, malformed subnet, unreadable config file.
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Could not determine the local network: {0}")]
    NetworkDetection(String),

    /// The link-layer sweep could not run (no usable interface, missing privileges).
    #[error("ARP sweep failed: {0}")]
    Sweep(String),

    #[error("Connection timed out after {} seconds", .0.as_secs())]
    Timeout(Duration),

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Request failed: {0}")]
    Request(String),

    #[error("Scan already in progress")]
    AlreadyRunning,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV export failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("Report serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}

impl ScanError {
    /// Maps a transport error against the primary target onto the three
    /// reported connectivity kinds.
    pub fn from_request(error: &reqwest::Error, timeout: Duration) -> Self {
        if error.is_timeout() {
            ScanError::Timeout(timeout)
        } else if error.is_connect() {
            ScanError::ConnectionFailed(error.to_string())
        } else {
            ScanError::Request(error.to_string())
        }
    }
}
