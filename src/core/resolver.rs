// src/core/resolver.rs

use crate::core::error::ScanError;
use crate::core::models::{AttackSurface, FormTarget, HttpMethod, UrlParam};
use ipnetwork::{IpNetwork, Ipv4Network};
use pnet::datalink;
use scraper::{Html, Selector};
use std::net::{IpAddr, Ipv4Addr, UdpSocket};
use tracing::{debug, info, warn};
use url::Url;

/// Public address used only to learn which local interface routes outbound.
/// UDP connect sends no packets.
const ROUTE_PROBE_ADDR: &str = "8.8.8.8:80";

const LOCALHOST_NAMES: &[&str] = &["localhost", "127.0.0.1", "::1", "0.0.0.0"];

// --- Network Resolution ---

/// Detects the local IPv4 address and the subnet it belongs to.
///
/// The interface carrying the outbound route is looked up to read its real
/// prefix. When no interface matches, the outbound address is assumed to sit
/// in a /24.
pub fn resolve_network() -> Result<(Ipv4Addr, Ipv4Network), ScanError> {
    let outbound = outbound_ipv4();
    debug!(outbound = ?outbound, "Probed outbound address.");

    let candidates: Vec<Ipv4Network> = datalink::interfaces()
        .into_iter()
        .filter(|iface| iface.is_up() && !iface.is_loopback())
        .flat_map(|iface| iface.ips)
        .filter_map(|ip| match ip {
            IpNetwork::V4(net) => Some(net),
            IpNetwork::V6(_) => None,
        })
        .collect();

    if let Some(found) = pick_network(&candidates, outbound) {
        info!(local_ip = %found.0, subnet = %found.1, "Detected local network.");
        return Ok(found);
    }

    match outbound {
        Some(ip) => {
            warn!(local_ip = %ip, "Interface prefix unknown, assuming /24.");
            Ok((ip, fallback_network(ip)?))
        }
        None => Err(ScanError::NetworkDetection(
            "no active interface and no default route".to_string(),
        )),
    }
}

/// Picks the interface network holding `preferred`, or the first usable one
/// when there is no preference.
pub fn pick_network(
    candidates: &[Ipv4Network],
    preferred: Option<Ipv4Addr>,
) -> Option<(Ipv4Addr, Ipv4Network)> {
    let usable = candidates
        .iter()
        .filter(|net| !net.ip().is_loopback() && !net.ip().is_link_local() && net.prefix() < 32);

    let chosen = match preferred {
        Some(ip) => usable.into_iter().find(|net| net.ip() == ip),
        None => usable.into_iter().next(),
    }?;
    let network = Ipv4Network::new(chosen.network(), chosen.prefix()).ok()?;
    Some((chosen.ip(), network))
}

pub fn fallback_network(ip: Ipv4Addr) -> Result<Ipv4Network, ScanError> {
    let [a, b, c, _] = ip.octets();
    Ipv4Network::new(Ipv4Addr::new(a, b, c, 0), 24)
        .map_err(|e| ScanError::NetworkDetection(e.to_string()))
}

fn outbound_ipv4() -> Option<Ipv4Addr> {
    let socket = UdpSocket::bind("0.0.0.0:0").ok()?;
    socket.connect(ROUTE_PROBE_ADDR).ok()?;
    match socket.local_addr().ok()?.ip() {
        IpAddr::V4(ip) if !ip.is_unspecified() => Some(ip),
        _ => None,
    }
}

/// Parses a user-supplied CIDR, normalizing host bits away.
pub fn parse_subnet(raw: &str) -> Result<Ipv4Network, ScanError> {
    let raw = raw.trim();
    if !raw.contains('/') {
        return Err(ScanError::Config(format!("'{}' is not a CIDR subnet", raw)));
    }
    let net: Ipv4Network = raw
        .parse()
        .map_err(|e| ScanError::Config(format!("invalid subnet '{}': {}", raw, e)))?;
    Ipv4Network::new(net.network(), net.prefix())
        .map_err(|e| ScanError::Config(format!("invalid subnet '{}': {}", raw, e)))
}

// --- Web Targets ---

/// Accepts only http(s) URLs with a host.
pub fn validate_target_url(raw: &str) -> Result<Url, ScanError> {
    let url = Url::parse(raw.trim())
        .map_err(|e| ScanError::Config(format!("invalid URL '{}': {}", raw, e)))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ScanError::Config("URL must start with http:// or https://".to_string()));
    }
    if url.host_str().is_none_or(str::is_empty) {
        return Err(ScanError::Config(format!("URL '{}' has no host", raw)));
    }
    Ok(url)
}

pub fn is_localhost(url: &Url) -> bool {
    url.host_str()
        .map(|host| host.trim_start_matches('[').trim_end_matches(']').to_lowercase())
        .is_some_and(|host| LOCALHOST_NAMES.contains(&host.as_str()))
}

/// Collects the target's query parameters and the forms on its page.
pub fn extract_attack_surface(html: &str, target: &Url) -> AttackSurface {
    let mut base_url = target.clone();
    base_url.set_query(None);
    base_url.set_fragment(None);

    let url_params = group_query_params(target);
    let forms = extract_forms(html, target);
    debug!(params = url_params.len(), forms = forms.len(), "Extracted attack surface.");

    AttackSurface { base_url, url_params, forms }
}

fn group_query_params(url: &Url) -> Vec<UrlParam> {
    let mut params: Vec<UrlParam> = Vec::new();
    for (name, value) in url.query_pairs() {
        match params.iter_mut().find(|p| p.name == name) {
            Some(existing) => existing.values.push(value.into_owned()),
            None => params.push(UrlParam { name: name.into_owned(), values: vec![value.into_owned()] }),
        }
    }
    params
}

fn extract_forms(html: &str, page_url: &Url) -> Vec<FormTarget> {
    let (Ok(form_selector), Ok(field_selector)) =
        (Selector::parse("form"), Selector::parse("input, textarea"))
    else {
        return Vec::new();
    };

    let document = Html::parse_document(html);
    let mut forms = Vec::new();

    for form in document.select(&form_selector) {
        let action = match form.value().attr("action").filter(|a| !a.is_empty()) {
            Some(raw) => match page_url.join(raw) {
                Ok(url) => url,
                Err(e) => {
                    debug!(action = raw, error = %e, "Skipping form with unresolvable action.");
                    continue;
                }
            },
            None => page_url.clone(),
        };

        let mut inputs: Vec<String> = Vec::new();
        for field in form.select(&field_selector) {
            if let Some(name) = field.value().attr("name").filter(|n| !n.is_empty()) {
                if !inputs.iter().any(|existing| existing == name) {
                    inputs.push(name.to_string());
                }
            }
        }

        if inputs.is_empty() {
            debug!(action = %action, "Form has no named fields, nothing to probe.");
            continue;
        }

        forms.push(FormTarget {
            action,
            method: HttpMethod::from_form_attr(form.value().attr("method")),
            inputs,
        });
    }
    forms
}
