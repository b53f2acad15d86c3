// src/core/models.rs

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::net::Ipv4Addr;
use strum::{Display, EnumIter, IntoEnumIterator};

// --- Reusable Result Types ---

/// Outcome of a fail-soft enrichment step.
///
/// Every fallback value (`"Unknown"`, `"N/A"`) is an explicit branch: the step
/// either produced a real value or degraded to its default, with the reason
/// kept around for logging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome<T> {
    Success(T),
    Degraded { value: T, reason: String },
}

impl<T> StepOutcome<T> {
    pub fn degraded(value: T, reason: impl Into<String>) -> Self {
        Self::Degraded { value, reason: reason.into() }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::Degraded { .. })
    }

    pub fn into_value(self) -> T {
        match self {
            Self::Success(value) | Self::Degraded { value, .. } => value,
        }
    }
}

// --- Host Discovery Models ---

/// A host that answered the link-layer sweep.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    pub ip: Ipv4Addr,
    pub mac: String,
}

/// The three well-known services checked on every host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumIter)]
pub enum Service {
    #[strum(serialize = "SSH")]
    Ssh,
    #[strum(serialize = "HTTP")]
    Http,
    #[strum(serialize = "HTTPS")]
    Https,
}

impl Service {
    pub fn port(self) -> u16 {
        match self {
            Service::Ssh => 22,
            Service::Http => 80,
            Service::Https => 443,
        }
    }

    /// Column header used in tabular reports, e.g. `SSH (22)`.
    pub fn column(self) -> String {
        format!("{} ({})", self, self.port())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, Serialize, Deserialize)]
pub enum PortState {
    Open,
    #[default]
    Closed,
}

/// Port status for the fixed service set. One field per service, so a record
/// can never carry a missing or extra key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PortStatus {
    #[serde(rename = "SSH (22)")]
    pub ssh: PortState,
    #[serde(rename = "HTTP (80)")]
    pub http: PortState,
    #[serde(rename = "HTTPS (443)")]
    pub https: PortState,
}

impl PortStatus {
    pub fn get(&self, service: Service) -> PortState {
        match service {
            Service::Ssh => self.ssh,
            Service::Http => self.http,
            Service::Https => self.https,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Service, PortState)> + '_ {
        Service::iter().map(|service| (service, self.get(service)))
    }
}

/// A discovered host after enrichment. Serialized with the report column names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostRecord {
    #[serde(rename = "IP Address")]
    pub ip: Ipv4Addr,
    #[serde(rename = "MAC Address")]
    pub mac: String,
    #[serde(rename = "Vendor")]
    pub vendor: String,
    #[serde(rename = "Hostname")]
    pub hostname: String,
    #[serde(flatten)]
    pub ports: PortStatus,
}

/// Column order of the host report. CSV exports and the host table follow it.
pub const HOST_REPORT_FIELDS: [&str; 7] = [
    "IP Address",
    "MAC Address",
    "Vendor",
    "Hostname",
    "SSH (22)",
    "HTTP (80)",
    "HTTPS (443)",
];

/// Aggregate counters shown next to a host scan result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct HostStatistics {
    pub total_hosts: usize,
    pub ssh_open: usize,
    pub http_open: usize,
    pub https_open: usize,
}

impl HostStatistics {
    pub fn from_hosts(hosts: &[HostRecord]) -> Self {
        let open = |service: Service| {
            hosts
                .iter()
                .filter(|h| h.ports.get(service) == PortState::Open)
                .count()
        };
        Self {
            total_hosts: hosts.len(),
            ssh_open: open(Service::Ssh),
            http_open: open(Service::Http),
            https_open: open(Service::Https),
        }
    }
}

// --- Web Probing Models ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
pub enum HttpMethod {
    #[strum(serialize = "GET")]
    #[serde(rename = "GET")]
    Get,
    #[strum(serialize = "POST")]
    #[serde(rename = "POST")]
    Post,
}

impl HttpMethod {
    /// Form methods are case-insensitive; anything but POST is submitted as GET.
    pub fn from_form_attr(raw: Option<&str>) -> Self {
        match raw.map(|m| m.trim().to_uppercase()) {
            Some(m) if m == "POST" => HttpMethod::Post,
            _ => HttpMethod::Get,
        }
    }
}

/// A query parameter of the target URL. Repeated keys are grouped, keeping
/// every value in its original order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlParam {
    pub name: String,
    pub values: Vec<String>,
}

/// A form found on the target page with at least one named field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormTarget {
    pub action: url::Url,
    pub method: HttpMethod,
    pub inputs: Vec<String>,
}

/// Everything on the target that accepts input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttackSurface {
    /// Target URL with query and fragment stripped.
    pub base_url: url::Url,
    pub url_params: Vec<UrlParam>,
    pub forms: Vec<FormTarget>,
}

impl AttackSurface {
    pub fn is_empty(&self) -> bool {
        self.url_params.is_empty() && self.forms.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
pub enum FindingKind {
    #[strum(serialize = "Reflected XSS")]
    #[serde(rename = "Reflected XSS")]
    ReflectedXss,
    #[strum(serialize = "XSS in Form")]
    #[serde(rename = "XSS in Form")]
    FormXss,
    #[strum(serialize = "SQL Injection")]
    #[serde(rename = "SQL Injection")]
    SqlInjection,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    #[serde(rename = "type")]
    pub kind: FindingKind,
    pub url: String,
    pub method: HttpMethod,
    pub payload: String,
    pub evidence: String,
}

/// Persisted envelope of a vulnerability scan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanReport {
    pub target_url: String,
    pub scan_time: DateTime<Local>,
    pub vulnerabilities_found: usize,
    pub findings: Vec<Finding>,
}

impl ScanReport {
    pub fn new(target_url: &str, findings: Vec<Finding>) -> Self {
        Self {
            target_url: target_url.to_string(),
            scan_time: Local::now(),
            vulnerabilities_found: findings.len(),
            findings,
        }
    }
}

// --- Scan Status Models ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, Serialize)]
pub enum ScanPhase {
    #[default]
    Idle,
    Running,
    Done,
    Error,
}

/// Results held by the status record once a scan is done.
#[derive(Debug, Clone)]
pub enum ScanOutcome {
    Hosts(Vec<HostRecord>),
    Vulnerabilities(ScanReport),
}

/// The live status of the one scan this process may run at a time.
#[derive(Debug, Clone, Default)]
pub struct ScanStatus {
    pub phase: ScanPhase,
    pub progress: u8,
    pub message: String,
    pub local_ip: Option<Ipv4Addr>,
    pub subnet: Option<String>,
    pub results: Option<ScanOutcome>,
}

/// What a status poll returns. Safe to produce before any scan has run.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct StatusReport {
    pub scanning: bool,
    pub progress: u8,
    pub message: String,
    pub local_ip: Option<Ipv4Addr>,
    pub subnet: Option<String>,
    pub has_results: bool,
}

impl From<&ScanStatus> for StatusReport {
    fn from(status: &ScanStatus) -> Self {
        Self {
            scanning: status.phase == ScanPhase::Running,
            progress: status.progress,
            message: status.message.clone(),
            local_ip: status.local_ip,
            subnet: status.subnet.clone(),
            has_results: status.results.is_some(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn host(ip: [u8; 4], ssh: PortState, https: PortState) -> HostRecord {
        HostRecord {
            ip: Ipv4Addr::from(ip),
            mac: "aa:bb:cc:dd:ee:ff".into(),
            vendor: "Unknown".into(),
            hostname: "N/A".into(),
            ports: PortStatus { ssh, http: PortState::Closed, https },
        }
    }

    #[test]
    fn host_record_serializes_with_report_columns() {
        let value = serde_json::to_value(host([10, 0, 0, 2], PortState::Open, PortState::Closed)).unwrap();
        let object = value.as_object().unwrap();
        let mut keys: Vec<&str> = object.keys().map(String::as_str).collect();
        keys.sort_unstable();
        let mut expected = HOST_REPORT_FIELDS.to_vec();
        expected.sort_unstable();
        assert_eq!(keys, expected);
        assert_eq!(object["SSH (22)"], "Open");
        assert_eq!(object["HTTPS (443)"], "Closed");
        assert_eq!(object["IP Address"], "10.0.0.2");
    }

    #[test]
    fn port_status_always_covers_the_fixed_services() {
        let status = PortStatus::default();
        let services: Vec<String> = status.iter().map(|(s, _)| s.column()).collect();
        assert_eq!(services, vec!["SSH (22)", "HTTP (80)", "HTTPS (443)"]);
        assert!(status.iter().all(|(_, state)| state == PortState::Closed));
    }

    #[test]
    fn statistics_count_open_services() {
        let hosts = vec![
            host([10, 0, 0, 1], PortState::Open, PortState::Open),
            host([10, 0, 0, 2], PortState::Closed, PortState::Open),
        ];
        let stats = HostStatistics::from_hosts(&hosts);
        assert_eq!(stats.total_hosts, 2);
        assert_eq!(stats.ssh_open, 1);
        assert_eq!(stats.http_open, 0);
        assert_eq!(stats.https_open, 2);
    }

    #[test]
    fn form_method_is_case_insensitive() {
        assert_eq!(HttpMethod::from_form_attr(Some("post")), HttpMethod::Post);
        assert_eq!(HttpMethod::from_form_attr(Some("Get")), HttpMethod::Get);
        assert_eq!(HttpMethod::from_form_attr(None), HttpMethod::Get);
        assert_eq!(HttpMethod::from_form_attr(Some("put")), HttpMethod::Get);
    }

    #[test]
    fn finding_serializes_type_name() {
        let finding = Finding {
            kind: FindingKind::FormXss,
            url: "http://t/search".into(),
            method: HttpMethod::Post,
            payload: "x".into(),
            evidence: "x...".into(),
        };
        let value = serde_json::to_value(&finding).unwrap();
        assert_eq!(value["type"], "XSS in Form");
        assert_eq!(value["method"], "POST");
    }

    #[test]
    fn status_report_defaults_before_any_scan() {
        let report = StatusReport::from(&ScanStatus::default());
        assert_eq!(report, StatusReport::default());
        assert!(!report.scanning);
        assert!(!report.has_results);
    }
}
