// src/core/report.rs

use crate::core::error::ScanError;
use crate::core::models::{HOST_REPORT_FIELDS, HostRecord, ScanReport};
use chrono::Local;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::info;

const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

const REPORT_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S_%3f";

/// Creates a file that did not exist before, appending `_1`, `_2`, ... to
/// the stem until the name is free.
fn create_unique(dir: &Path, stem: &str, extension: &str) -> io::Result<(PathBuf, File)> {
    let mut attempt = 0u32;
    loop {
        let name = match attempt {
            0 => format!("{}.{}", stem, extension),
            n => format!("{}_{}.{}", stem, n, extension),
        };
        let path = dir.join(name);
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => return Ok((path, file)),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => attempt += 1,
            Err(e) => return Err(e),
        }
    }
}

/// Writes the vulnerability report as pretty JSON into `dir`, creating it when
/// needed, and returns the file path. Earlier reports are never overwritten.
pub fn save_report(dir: &Path, report: &ScanReport) -> Result<PathBuf, ScanError> {
    fs::create_dir_all(dir)?;
    let stem = format!("vuln_report_{}", report.scan_time.format(REPORT_TIMESTAMP_FORMAT));
    let (path, mut file) = create_unique(dir, &stem, "json")?;
    serde_json::to_writer_pretty(&mut file, report)?;
    file.flush()?;
    info!(path = %path.display(), findings = report.vulnerabilities_found, "Report saved.");
    Ok(path)
}

/// The host row in report column order.
pub fn host_row(host: &HostRecord) -> [String; 7] {
    [
        host.ip.to_string(),
        host.mac.clone(),
        host.vendor.clone(),
        host.hostname.clone(),
        host.ports.ssh.to_string(),
        host.ports.http.to_string(),
        host.ports.https.to_string(),
    ]
}

/// Exports the host list as CSV. Returns `None` and writes nothing when there
/// are no hosts.
pub fn export_to_csv(hosts: &[HostRecord], dir: &Path, filename: Option<&str>) -> Result<Option<PathBuf>, ScanError> {
    if hosts.is_empty() {
        return Ok(None);
    }

    let mut name = match filename.map(str::trim).filter(|n| !n.is_empty()) {
        Some(name) => name.to_string(),
        None => format!("netmap_scan_{}", Local::now().format(TIMESTAMP_FORMAT)),
    };
    if !name.ends_with(".csv") {
        name.push_str(".csv");
    }

    fs::create_dir_all(dir)?;
    let path = dir.join(name);
    let mut writer = csv::Writer::from_path(&path)?;
    writer.write_record(HOST_REPORT_FIELDS)?;
    for host in hosts {
        writer.write_record(host_row(host))?;
    }
    writer.flush()?;

    info!(path = %path.display(), hosts = hosts.len(), "Hosts exported.");
    Ok(Some(path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::{Finding, FindingKind, HttpMethod, PortState, PortStatus};
    use std::net::Ipv4Addr;

    fn host(last: u8) -> HostRecord {
        HostRecord {
            ip: Ipv4Addr::new(192, 168, 1, last),
            mac: format!("aa:bb:cc:dd:ee:{:02x}", last),
            vendor: "Acme, Inc.".into(),
            hostname: "N/A".into(),
            ports: PortStatus { ssh: PortState::Open, ..Default::default() },
        }
    }

    #[test]
    fn csv_follows_report_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = export_to_csv(&[host(2), host(10)], dir.path(), Some("lan")).unwrap().unwrap();
        assert_eq!(path.file_name().unwrap(), "lan.csv");

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "IP Address,MAC Address,Vendor,Hostname,SSH (22),HTTP (80),HTTPS (443)");
        assert_eq!(lines[1], "192.168.1.2,aa:bb:cc:dd:ee:02,\"Acme, Inc.\",N/A,Open,Closed,Closed");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn empty_host_list_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        assert!(export_to_csv(&[], dir.path(), None).unwrap().is_none());
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn default_csv_name_is_timestamped() {
        let dir = tempfile::tempdir().unwrap();
        let path = export_to_csv(&[host(3)], dir.path(), None).unwrap().unwrap();
        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("netmap_scan_") && name.ends_with(".csv"), "{}", name);
    }

    #[test]
    fn report_round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let report = ScanReport::new(
            "http://t.test/?id=1",
            vec![Finding {
                kind: FindingKind::SqlInjection,
                url: "http://t.test/?id=%27".into(),
                method: HttpMethod::Get,
                payload: "'".into(),
                evidence: "SQL error message detected".into(),
            }],
        );
        let path = save_report(&dir.path().join("reports"), &report).unwrap();
        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("vuln_report_") && name.ends_with(".json"));

        let value: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["vulnerabilities_found"], 1);
        assert_eq!(value["findings"][0]["type"], "SQL Injection");
        assert_eq!(value["target_url"], "http://t.test/?id=1");
    }

    #[test]
    fn reports_from_the_same_instant_do_not_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let report = ScanReport::new("http://t.test/", Vec::new());

        let first = save_report(dir.path(), &report).unwrap();
        let second = save_report(dir.path(), &report).unwrap();
        assert_ne!(first, second);
        assert!(second.file_name().unwrap().to_string_lossy().ends_with("_1.json"));
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 2);
    }
}
