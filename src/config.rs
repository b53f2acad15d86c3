// src/config.rs

use crate::core::error::ScanError;
use crate::logging::{get_config_dir, get_data_dir};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

/// Environment variable pointing at an explicit config file.
pub const CONFIG_ENV: &str = "VANGUARD_RECON_CONFIG";

/// Tunables for both scan pipelines. Every field has a default, so a config
/// file only needs to name what it changes.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Width of the worker pool used for enrichment and probe fan-out.
    pub workers: usize,
    /// Fixed pause after every injection probe request.
    pub request_delay_ms: u64,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    pub arp_timeout_secs: u64,
    pub vendor_timeout_ms: u64,
    pub vendor_api_url: String,
    /// Pause between the vendor lookup and the hostname lookup.
    pub hostname_delay_ms: u64,
    pub hostname_timeout_ms: u64,
    pub port_timeout_ms: u64,
    pub sqli_payloads: Option<PathBuf>,
    pub xss_payloads: Option<PathBuf>,
    pub report_dir: Option<PathBuf>,
    pub export_dir: Option<PathBuf>,
    pub save_reports: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            workers: 10,
            request_delay_ms: 1000,
            request_timeout_secs: 10,
            user_agent: "VanguardRecon/0.1 (Authorized Testing Only)".to_string(),
            arp_timeout_secs: 3,
            vendor_timeout_ms: 2000,
            vendor_api_url: "https://api.macvendors.com".to_string(),
            hostname_delay_ms: 300,
            hostname_timeout_ms: 2000,
            port_timeout_ms: 1000,
            sqli_payloads: None,
            xss_payloads: None,
            report_dir: None,
            export_dir: None,
            save_reports: true,
        }
    }
}

impl ScanConfig {
    /// Loads the config from `$VANGUARD_RECON_CONFIG`, then from the user
    /// config directory, and falls back to defaults when neither exists.
    pub fn load() -> Result<Self, ScanError> {
        let path = std::env::var_os(CONFIG_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| get_config_dir().join("config.toml"));

        if !path.exists() {
            debug!(path = %path.display(), "No config file, using defaults.");
            return Ok(Self::default());
        }
        Self::from_file(&path)
    }

    pub fn from_file(path: &Path) -> Result<Self, ScanError> {
        info!(path = %path.display(), "Loading config file.");
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml(&raw)
    }

    pub fn from_toml(raw: &str) -> Result<Self, ScanError> {
        toml::from_str(raw).map_err(|e| ScanError::Config(format!("invalid config file: {}", e)))
    }

    pub fn worker_count(&self) -> usize {
        self.workers.max(1)
    }

    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn arp_timeout(&self) -> Duration {
        Duration::from_secs(self.arp_timeout_secs)
    }

    pub fn vendor_timeout(&self) -> Duration {
        Duration::from_millis(self.vendor_timeout_ms)
    }

    pub fn hostname_delay(&self) -> Duration {
        Duration::from_millis(self.hostname_delay_ms)
    }

    pub fn hostname_timeout(&self) -> Duration {
        Duration::from_millis(self.hostname_timeout_ms)
    }

    pub fn port_timeout(&self) -> Duration {
        Duration::from_millis(self.port_timeout_ms)
    }

    pub fn sqli_payload_path(&self) -> PathBuf {
        self.sqli_payloads
            .clone()
            .unwrap_or_else(|| get_data_dir().join("payloads").join("sqli_payloads.txt"))
    }

    pub fn xss_payload_path(&self) -> PathBuf {
        self.xss_payloads
            .clone()
            .unwrap_or_else(|| get_data_dir().join("payloads").join("xss_payloads.txt"))
    }

    pub fn report_dir(&self) -> PathBuf {
        self.report_dir.clone().unwrap_or_else(|| get_data_dir().join("reports"))
    }

    pub fn export_dir(&self) -> PathBuf {
        self.export_dir.clone().unwrap_or_else(|| get_data_dir().join("exports"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_remaining_defaults() {
        let config = ScanConfig::from_toml("workers = 4\nrequest_delay_ms = 0\n").unwrap();
        assert_eq!(config.workers, 4);
        assert_eq!(config.request_delay(), Duration::ZERO);
        assert_eq!(config.port_timeout(), Duration::from_secs(1));
        assert_eq!(config.vendor_api_url, "https://api.macvendors.com");
        assert!(config.save_reports);
    }

    #[test]
    fn malformed_file_is_a_config_error() {
        let err = ScanConfig::from_toml("workers = \"many\"").unwrap_err();
        assert!(matches!(err, ScanError::Config(_)));
    }

    #[test]
    fn zero_workers_is_clamped() {
        let config = ScanConfig { workers: 0, ..Default::default() };
        assert_eq!(config.worker_count(), 1);
    }

    #[test]
    fn explicit_payload_path_wins() {
        let config = ScanConfig {
            sqli_payloads: Some(PathBuf::from("/tmp/custom.txt")),
            ..Default::default()
        };
        assert_eq!(config.sqli_payload_path(), PathBuf::from("/tmp/custom.txt"));
        assert!(config.xss_payload_path().ends_with("payloads/xss_payloads.txt"));
    }
}
