// src/core/scanner/mod.rs

// Public interface of the `scanner` module: the probes of both pipelines and
// the orchestrator that sequences them.
pub mod arp;
pub mod host_scanner;
pub mod netbios;
pub mod sqli_scanner;
pub mod web_scanner;
pub mod xss_scanner;

use crate::config::ScanConfig;
use crate::core::error::ScanError;
use crate::core::models::{HostRecord, ScanOutcome, ScanReport, ScanStatus, StatusReport};
use crate::core::report::save_report;
use crate::core::resolver::validate_target_url;
use crate::core::status::StatusBoard;
use self::arp::{ArpSweep, PnetArpSweep};
use self::host_scanner::{HostProber, run_host_scan};
use self::web_scanner::run_web_scan;
use ipnetwork::Ipv4Network;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// Owns the scan status and runs at most one scan at a time.
///
/// Cloning is cheap and every clone shares the same status record, so a
/// front-end can keep one clone for polling while a background task runs the
/// scan on another.
#[derive(Clone)]
pub struct Orchestrator {
    config: Arc<ScanConfig>,
    status: StatusBoard,
    arp: Arc<dyn ArpSweep>,
}

impl Orchestrator {
    pub fn new(config: ScanConfig) -> Self {
        Self::with_arp_sweep(config, Arc::new(PnetArpSweep))
    }

    /// Orchestrator with a custom link-layer sweeper.
    pub fn with_arp_sweep(config: ScanConfig, arp: Arc<dyn ArpSweep>) -> Self {
        Self { config: Arc::new(config), status: StatusBoard::new(), arp }
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    pub fn status(&self) -> &StatusBoard {
        &self.status
    }

    /// Non-blocking status query. Safe before any scan has run.
    pub fn poll(&self) -> StatusReport {
        self.status.poll()
    }

    pub fn snapshot(&self) -> ScanStatus {
        self.status.snapshot()
    }

    // --- Background Starts ---

    /// Starts a host scan in the background and returns at once.
    ///
    /// A second start while a scan is running fails with `AlreadyRunning`.
    pub fn start_host_scan(&self, subnet: Option<Ipv4Network>) -> Result<JoinHandle<()>, ScanError> {
        self.status.begin()?;
        let this = self.clone();
        Ok(tokio::spawn(async move {
            let _ = this.host_scan_claimed(subnet).await;
        }))
    }

    /// Starts a web scan in the background and returns at once. The URL is
    /// validated before the status is touched.
    pub fn start_web_scan(&self, target: &str) -> Result<JoinHandle<()>, ScanError> {
        let target = validate_target_url(target)?;
        self.status.begin()?;
        let this = self.clone();
        Ok(tokio::spawn(async move {
            let _ = this.web_scan_claimed(target).await;
        }))
    }

    // --- Awaitable Scans ---

    /// Runs a host scan to completion.
    ///
    /// Zero replies is a successful, empty scan. Only network detection and
    /// sweep failures are errors.
    pub async fn scan_network(&self, subnet: Option<Ipv4Network>) -> Result<Vec<HostRecord>, ScanError> {
        self.status.begin()?;
        self.host_scan_claimed(subnet).await
    }

    /// Runs a web scan to completion.
    pub async fn scan_target(&self, target: &str) -> Result<ScanReport, ScanError> {
        let target = validate_target_url(target)?;
        self.status.begin()?;
        self.web_scan_claimed(target).await
    }

    async fn host_scan_claimed(&self, subnet: Option<Ipv4Network>) -> Result<Vec<HostRecord>, ScanError> {
        let prober = Arc::new(HostProber::new(self.config.clone()));
        let result = run_host_scan(self.config.clone(), self.arp.clone(), prober, &self.status, subnet).await;

        match result {
            Ok(hosts) if hosts.is_empty() => {
                info!("No devices found.");
                self.status.finish(ScanOutcome::Hosts(Vec::new()), "No devices found");
                Ok(hosts)
            }
            Ok(hosts) => {
                info!(hosts = hosts.len(), "Host scan complete.");
                self.status.finish(
                    ScanOutcome::Hosts(hosts.clone()),
                    format!("Scan complete! Found {} hosts", hosts.len()),
                );
                Ok(hosts)
            }
            Err(e) => {
                error!(error = %e, "Host scan failed.");
                self.status.fail(&e);
                Err(e)
            }
        }
    }

    async fn web_scan_claimed(&self, target: url::Url) -> Result<ScanReport, ScanError> {
        info!(url = %target, "Starting web scan.");
        let report = match run_web_scan(self.config.clone(), &self.status, target).await {
            Ok(report) => report,
            Err(e) => {
                error!(error = %e, "Web scan failed.");
                self.status.fail(&e);
                return Err(e);
            }
        };

        if self.config.save_reports {
            if let Err(e) = save_report(&self.config.report_dir(), &report) {
                warn!(error = %e, "Could not save the report.");
            }
        }

        self.status.finish(
            ScanOutcome::Vulnerabilities(report.clone()),
            format!("Scan complete! Found {} vulnerabilities", report.vulnerabilities_found),
        );
        Ok(report)
    }
}
