// src/core/scanner/host_scanner.rs

use crate::config::ScanConfig;
use crate::core::error::ScanError;
use crate::core::models::{HostRecord, PortState, PortStatus, Service, StepOutcome, Target};
use crate::core::resolver::resolve_network;
use crate::core::scanner::arp::ArpSweep;
use crate::core::scanner::netbios;
use crate::core::scheduler::{band_progress, run_bounded};
use crate::core::status::StatusBoard;
use hickory_resolver::TokioAsyncResolver;
use hickory_resolver::config::{ResolverConfig, ResolverOpts};
use ipnetwork::Ipv4Network;
use std::convert::Infallible;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;
use tokio::net::TcpStream;
use tracing::{debug, info, instrument, warn};

pub const UNKNOWN_VENDOR: &str = "Unknown";
pub const UNKNOWN_HOSTNAME: &str = "N/A";

/// Enriches discovered hosts with vendor, hostname and service details.
///
/// One prober is shared by every enrichment task; each lookup degrades to its
/// default value instead of failing the host.
pub struct HostProber {
    http: reqwest::Client,
    resolver: Option<TokioAsyncResolver>,
    config: Arc<ScanConfig>,
}

impl HostProber {
    pub fn new(config: Arc<ScanConfig>) -> Self {
        let resolver = match TokioAsyncResolver::tokio_from_system_conf() {
            Ok(resolver) => resolver,
            Err(e) => {
                debug!(error = %e, "System resolver config unavailable, using defaults.");
                TokioAsyncResolver::tokio(ResolverConfig::default(), ResolverOpts::default())
            }
        };
        Self { http: vendor_client(&config), resolver: Some(resolver), config }
    }

    /// Prober without reverse DNS; hostnames come from NetBIOS only.
    pub fn without_dns(config: Arc<ScanConfig>) -> Self {
        Self { http: vendor_client(&config), resolver: None, config }
    }

    /// Looks up the manufacturer registered for the MAC's OUI.
    pub async fn lookup_vendor(&self, mac: &str) -> StepOutcome<String> {
        let url = format!("{}/{}", self.config.vendor_api_url.trim_end_matches('/'), mac);
        let response = match self.http.get(&url).send().await {
            Ok(response) => response,
            Err(e) => return StepOutcome::degraded(UNKNOWN_VENDOR.to_string(), e.to_string()),
        };

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            return StepOutcome::degraded(UNKNOWN_VENDOR.to_string(), format!("vendor API answered {}", status));
        }
        match response.text().await {
            Ok(body) if !body.trim().is_empty() => StepOutcome::Success(body.trim().to_string()),
            Ok(_) => StepOutcome::degraded(UNKNOWN_VENDOR.to_string(), "empty vendor body"),
            Err(e) => StepOutcome::degraded(UNKNOWN_VENDOR.to_string(), e.to_string()),
        }
    }

    /// Reverse DNS first, then a NetBIOS node status query.
    pub async fn lookup_hostname(&self, ip: Ipv4Addr) -> StepOutcome<String> {
        let timeout = self.config.hostname_timeout();

        let mut reason = "no resolver".to_string();
        if let Some(resolver) = &self.resolver {
            match tokio::time::timeout(timeout, resolver.reverse_lookup(IpAddr::V4(ip))).await {
                Ok(Ok(lookup)) => {
                    if let Some(name) = lookup.iter().next() {
                        let name = name.to_string().trim_end_matches('.').to_string();
                        if !name.is_empty() {
                            return StepOutcome::Success(name);
                        }
                    }
                    reason = "empty PTR answer".to_string();
                }
                Ok(Err(e)) => reason = e.to_string(),
                Err(_) => reason = "reverse lookup timed out".to_string(),
            }
        }

        match netbios::query_name(ip, timeout).await {
            Some(name) => StepOutcome::Success(name),
            None => StepOutcome::degraded(UNKNOWN_HOSTNAME.to_string(), format!("{}; no NetBIOS answer", reason)),
        }
    }

    /// Plain TCP connect; anything short of a completed handshake is Closed.
    pub async fn check_port(&self, ip: Ipv4Addr, port: u16) -> PortState {
        let addr = SocketAddr::from((ip, port));
        match tokio::time::timeout(self.config.port_timeout(), TcpStream::connect(addr)).await {
            Ok(Ok(_)) => PortState::Open,
            _ => PortState::Closed,
        }
    }

    pub async fn check_common_ports(&self, ip: Ipv4Addr) -> PortStatus {
        let (ssh, http, https) = tokio::join!(
            self.check_port(ip, Service::Ssh.port()),
            self.check_port(ip, Service::Http.port()),
            self.check_port(ip, Service::Https.port())
        );
        PortStatus { ssh, http, https }
    }

    /// Runs the full enrichment sequence for one host.
    pub async fn enrich_host(&self, target: Target) -> HostRecord {
        debug!(ip = %target.ip, "Gathering host details.");

        let vendor = self.lookup_vendor(&target.mac).await;
        if let StepOutcome::Degraded { reason, .. } = &vendor {
            debug!(ip = %target.ip, %reason, "Vendor lookup degraded.");
        }

        tokio::time::sleep(self.config.hostname_delay()).await;

        let hostname = self.lookup_hostname(target.ip).await;
        if let StepOutcome::Degraded { reason, .. } = &hostname {
            debug!(ip = %target.ip, %reason, "Hostname lookup degraded.");
        }

        let ports = self.check_common_ports(target.ip).await;

        HostRecord {
            ip: target.ip,
            mac: target.mac,
            vendor: vendor.into_value(),
            hostname: hostname.into_value(),
            ports,
        }
    }
}

fn vendor_client(config: &ScanConfig) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(config.vendor_timeout())
        .user_agent(config.user_agent.clone())
        .build()
        .unwrap_or_else(|e| {
            warn!(error = %e, "Falling back to a default HTTP client for vendor lookups.");
            reqwest::Client::new()
        })
}

/// Resolution, sweep and enrichment of one host scan.
///
/// The caller owns the Running/terminal transitions; this only reports the
/// intermediate progress steps. Hosts come back ordered by address.
#[instrument(name = "host_scan", skip_all, fields(subnet = ?subnet))]
pub async fn run_host_scan(
    config: Arc<ScanConfig>,
    arp: Arc<dyn ArpSweep>,
    prober: Arc<HostProber>,
    status: &StatusBoard,
    subnet: Option<Ipv4Network>,
) -> Result<Vec<HostRecord>, ScanError> {
    status.progress(10, "Detecting network...");
    let subnet = match subnet {
        Some(subnet) => {
            let local_ip = tokio::task::spawn_blocking(resolve_network)
                .await
                .ok()
                .and_then(Result::ok)
                .map(|(ip, _)| ip)
                .filter(|ip| subnet.contains(*ip));
            status.network(local_ip, subnet);
            subnet
        }
        None => {
            let (local_ip, subnet) = tokio::task::spawn_blocking(resolve_network)
                .await
                .map_err(|e| ScanError::NetworkDetection(e.to_string()))??;
            status.network(Some(local_ip), subnet);
            subnet
        }
    };

    status.progress(30, format!("Scanning network {}...", subnet));
    let timeout = config.arp_timeout();
    let mut targets = tokio::task::spawn_blocking(move || arp.sweep(subnet, timeout))
        .await
        .map_err(|e| ScanError::Sweep(e.to_string()))??;
    // One record per address, whatever the sweeper returned.
    targets.sort_by_key(|target| target.ip);
    targets.dedup_by_key(|target| target.ip);

    if targets.is_empty() {
        info!(%subnet, "Sweep finished without replies.");
        return Ok(Vec::new());
    }

    info!(hosts = targets.len(), "Enriching discovered hosts.");
    status.progress(60, format!("Gathering information for {} hosts...", targets.len()));

    let mut hosts = run_bounded(
        targets,
        config.worker_count(),
        |target: Target| {
            let prober = prober.clone();
            async move { Ok::<_, Infallible>(prober.enrich_host(target).await) }
        },
        |completed, total| {
            status.progress(
                band_progress(60, 35, completed, total),
                format!("Gathering information... ({}/{} hosts)", completed, total),
            );
        },
    )
    .await;

    hosts.sort_by_key(|host| host.ip);
    Ok(hosts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    fn config_for(vendor_api_url: String) -> Arc<ScanConfig> {
        Arc::new(ScanConfig {
            vendor_api_url,
            vendor_timeout_ms: 500,
            hostname_timeout_ms: 200,
            hostname_delay_ms: 0,
            port_timeout_ms: 300,
            ..Default::default()
        })
    }

    #[tokio::test]
    async fn vendor_body_is_returned_on_success() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/b8:27:eb:00:00:01")
            .with_status(200)
            .with_body("Raspberry Pi Foundation")
            .create_async()
            .await;

        let prober = HostProber::without_dns(config_for(server.url()));
        let vendor = prober.lookup_vendor("b8:27:eb:00:00:01").await;
        assert_eq!(vendor, StepOutcome::Success("Raspberry Pi Foundation".to_string()));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn vendor_errors_degrade_to_unknown() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", mockito::Matcher::Any)
            .with_status(404)
            .with_body("{\"errors\":{\"detail\":\"Not Found\"}}")
            .create_async()
            .await;

        let prober = HostProber::without_dns(config_for(server.url()));
        let vendor = prober.lookup_vendor("00:00:00:00:00:00").await;
        assert!(vendor.is_degraded());
        assert_eq!(vendor.into_value(), UNKNOWN_VENDOR);
    }

    #[tokio::test]
    async fn open_and_closed_ports_are_told_apart() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let open_port = listener.local_addr().unwrap().port();
        let closed_port = {
            let probe = TcpListener::bind("127.0.0.1:0").await.unwrap();
            probe.local_addr().unwrap().port()
        };

        let prober = HostProber::without_dns(config_for("http://127.0.0.1:9".to_string()));
        assert_eq!(prober.check_port(Ipv4Addr::LOCALHOST, open_port).await, PortState::Open);
        assert_eq!(prober.check_port(Ipv4Addr::LOCALHOST, closed_port).await, PortState::Closed);
    }
}
