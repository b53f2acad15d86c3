// src/core/status.rs

use crate::core::error::ScanError;
use crate::core::models::{ScanOutcome, ScanPhase, ScanStatus, StatusReport};
use ipnetwork::Ipv4Network;
use std::net::Ipv4Addr;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::debug;

/// Shared scan status record.
///
/// Only the orchestrator writes. Every write replaces the record under the
/// channel's lock, so a reader's `snapshot` is never a half-updated record,
/// and readers never wait on the scan itself.
#[derive(Clone)]
pub struct StatusBoard {
    tx: Arc<watch::Sender<ScanStatus>>,
}

impl Default for StatusBoard {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusBoard {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(ScanStatus::default());
        Self { tx: Arc::new(tx) }
    }

    pub fn snapshot(&self) -> ScanStatus {
        self.tx.borrow().clone()
    }

    /// The status polling contract.
    pub fn poll(&self) -> StatusReport {
        StatusReport::from(&*self.tx.borrow())
    }

    pub fn subscribe(&self) -> watch::Receiver<ScanStatus> {
        self.tx.subscribe()
    }

    /// Claims the board for a new scan.
    ///
    /// Fails with `AlreadyRunning` and leaves every field untouched when a
    /// scan is in flight. The check and the reset happen under one lock.
    pub fn begin(&self) -> Result<(), ScanError> {
        let claimed = self.tx.send_if_modified(|status| {
            if status.phase == ScanPhase::Running {
                return false;
            }
            status.phase = ScanPhase::Running;
            status.progress = 0;
            status.message = "Initializing scan...".to_string();
            status.results = None;
            true
        });
        if claimed {
            debug!("Status board claimed for a new scan.");
            Ok(())
        } else {
            Err(ScanError::AlreadyRunning)
        }
    }

    pub fn progress(&self, progress: u8, message: impl Into<String>) {
        let message = message.into();
        self.tx.send_modify(|status| {
            status.progress = progress.min(100);
            status.message = message;
        });
    }

    pub fn network(&self, local_ip: Option<Ipv4Addr>, subnet: Ipv4Network) {
        self.tx.send_modify(|status| {
            if local_ip.is_some() {
                status.local_ip = local_ip;
            }
            status.subnet = Some(subnet.to_string());
        });
    }

    pub fn finish(&self, outcome: ScanOutcome, message: impl Into<String>) {
        let message = message.into();
        self.tx.send_modify(|status| {
            status.phase = ScanPhase::Done;
            status.progress = 100;
            status.message = message;
            status.results = Some(outcome);
        });
    }

    pub fn fail(&self, error: &ScanError) {
        let message = format!("Error: {}", error);
        self.tx.send_modify(|status| {
            status.phase = ScanPhase::Error;
            status.progress = 0;
            status.message = message;
            status.results = None;
        });
    }
}
