// src/core/scanner/web_scanner.rs

use crate::config::ScanConfig;
use crate::core::error::ScanError;
use crate::core::models::{AttackSurface, Finding, FormTarget, ScanReport, UrlParam};
use crate::core::payloads::{SQLI_FALLBACK, XSS_FALLBACK, load_payloads};
use crate::core::resolver::{extract_attack_surface, is_localhost};
use crate::core::scanner::sqli_scanner::probe_sqli;
use crate::core::scanner::xss_scanner::{probe_form, probe_reflected};
use crate::core::scheduler::{band_progress, run_bounded};
use crate::core::status::StatusBoard;
use std::convert::Infallible;
use std::sync::Arc;
use tracing::{debug, info, instrument};
use url::Url;

/// One cell of the payload × parameter matrix.
#[derive(Debug, Clone)]
pub enum ProbeJob {
    Sqli { url: Url, payload: String },
    ReflectedXss { url: Url, payload: String },
    FormXss { form: Arc<FormTarget>, payload: String },
}

impl ProbeJob {
    pub async fn run(&self, client: &reqwest::Client) -> Option<Finding> {
        match self {
            ProbeJob::Sqli { url, payload } => probe_sqli(client, url, payload).await,
            ProbeJob::ReflectedXss { url, payload } => probe_reflected(client, url, payload).await,
            ProbeJob::FormXss { form, payload } => probe_form(client, form, payload).await,
        }
    }
}

/// Sends a probe request and returns the body only when the response counts:
/// it arrived and its status is below 400. Transport errors are swallowed.
pub(crate) async fn read_counted_body(request: reqwest::RequestBuilder) -> Option<String> {
    let response = match request.send().await {
        Ok(response) => response,
        Err(e) => {
            debug!(error = %e, "Probe request failed, skipping.");
            return None;
        }
    };
    let status = response.status();
    if status.as_u16() >= 400 {
        debug!(%status, "Probe answered with an error status, skipping.");
        return None;
    }
    response.text().await.ok()
}

/// Rebuilds the target URL with `payload` in place of every value of
/// `param`. The other parameters keep all their values.
pub fn build_probe_url(base: &Url, params: &[UrlParam], param: &str, payload: &str) -> Url {
    let mut url = base.clone();
    {
        let mut query = url.query_pairs_mut();
        for p in params {
            if p.name == param {
                query.append_pair(&p.name, payload);
            } else {
                for value in &p.values {
                    query.append_pair(&p.name, value);
                }
            }
        }
    }
    url
}

/// Expands the attack surface into the full probe matrix: SQLi and reflected
/// XSS for every URL parameter, form XSS for every form.
pub fn build_probe_matrix(surface: &AttackSurface, sqli: &[String], xss: &[String]) -> Vec<ProbeJob> {
    let mut jobs = Vec::new();

    for param in &surface.url_params {
        for payload in sqli {
            jobs.push(ProbeJob::Sqli {
                url: build_probe_url(&surface.base_url, &surface.url_params, &param.name, payload),
                payload: payload.clone(),
            });
        }
    }
    for param in &surface.url_params {
        for payload in xss {
            jobs.push(ProbeJob::ReflectedXss {
                url: build_probe_url(&surface.base_url, &surface.url_params, &param.name, payload),
                payload: payload.clone(),
            });
        }
    }
    for form in &surface.forms {
        let form = Arc::new(form.clone());
        for payload in xss {
            jobs.push(ProbeJob::FormXss { form: form.clone(), payload: payload.clone() });
        }
    }
    jobs
}

pub fn build_client(config: &ScanConfig) -> Result<reqwest::Client, ScanError> {
    reqwest::Client::builder()
        .user_agent(config.user_agent.clone())
        .timeout(config.request_timeout())
        .cookie_store(true)
        .build()
        .map_err(|e| ScanError::Request(format!("failed to build HTTP client: {}", e)))
}

/// Fetches the target, probes every injection point and returns the report.
///
/// Only failures to reach the target at all are errors. Findings arrive in
/// completion order.
#[instrument(name = "web_scan", skip_all, fields(url = %target))]
pub async fn run_web_scan(config: Arc<ScanConfig>, status: &StatusBoard, target: Url) -> Result<ScanReport, ScanError> {
    if is_localhost(&target) {
        info!(url = %target, "Local testing mode.");
    }
    let client = build_client(&config)?;

    status.progress(5, format!("Fetching {}...", target));
    let response = client
        .get(target.clone())
        .send()
        .await
        .map_err(|e| ScanError::from_request(&e, config.request_timeout()))?;
    let page_status = response.status();
    if page_status.as_u16() >= 400 {
        return Err(ScanError::Request(format!("{} answered with status {}", target, page_status)));
    }
    let html = response
        .text()
        .await
        .map_err(|e| ScanError::from_request(&e, config.request_timeout()))?;

    let sqli_payloads = load_payloads(&config.sqli_payload_path(), SQLI_FALLBACK);
    let xss_payloads = load_payloads(&config.xss_payload_path(), XSS_FALLBACK);
    let surface = extract_attack_surface(&html, &target);

    let jobs = build_probe_matrix(&surface, &sqli_payloads, &xss_payloads);
    info!(
        params = surface.url_params.len(),
        forms = surface.forms.len(),
        probes = jobs.len(),
        "Attack surface mapped."
    );
    status.progress(20, format!("Testing {} probes...", jobs.len()));

    let delay = config.request_delay();
    let findings: Vec<Finding> = run_bounded(
        jobs,
        config.worker_count(),
        |job: ProbeJob| {
            let client = client.clone();
            async move {
                let finding = job.run(&client).await;
                tokio::time::sleep(delay).await;
                Ok::<_, Infallible>(finding)
            }
        },
        |completed, total| {
            status.progress(
                band_progress(20, 75, completed, total),
                format!("Testing... ({}/{} probes)", completed, total),
            );
        },
    )
    .await
    .into_iter()
    .flatten()
    .collect();

    info!(url = %target, findings = findings.len(), "Web scan finished.");
    Ok(ScanReport::new(target.as_str(), findings))
}
