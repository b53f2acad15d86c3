// src/core/scanner/xss_scanner.rs

use crate::core::models::{Finding, FindingKind, FormTarget, HttpMethod};
use crate::core::scanner::web_scanner::read_counted_body;
use scraper::Html;
use tracing::{debug, info};
use url::Url;

const EVIDENCE_CHARS: usize = 50;

/// First 50 characters of the payload, marked as truncated.
pub fn evidence_for(payload: &str) -> String {
    let head: String = payload.chars().take(EVIDENCE_CHARS).collect();
    format!("{}...", head)
}

/// True when the payload came back verbatim and one parsed text node of the
/// page still holds it whole.
pub fn reflected_in_text(body: &str, payload: &str) -> bool {
    if payload.is_empty() || !body.contains(payload) {
        return false;
    }
    let document = Html::parse_document(body);
    let found = document.root_element().text().any(|node| node.contains(payload));
    debug!(found, "Checked parsed text nodes for the payload.");
    found
}

/// Reflected XSS through a URL parameter. `probe_url` already carries the
/// payload in one parameter.
pub async fn probe_reflected(client: &reqwest::Client, probe_url: &Url, payload: &str) -> Option<Finding> {
    let body = read_counted_body(client.get(probe_url.clone())).await?;
    if !reflected_in_text(&body, payload) {
        return None;
    }

    info!(url = %probe_url, "Payload reflected in page text.");
    Some(Finding {
        kind: FindingKind::ReflectedXss,
        url: probe_url.to_string(),
        method: HttpMethod::Get,
        payload: payload.to_string(),
        evidence: evidence_for(payload),
    })
}

/// Submits the form with `payload` in every field. A verbatim echo anywhere in
/// the body is a finding.
pub async fn probe_form(client: &reqwest::Client, form: &FormTarget, payload: &str) -> Option<Finding> {
    let fields: Vec<(&str, &str)> = form.inputs.iter().map(|name| (name.as_str(), payload)).collect();
    let request = match form.method {
        HttpMethod::Post => client.post(form.action.clone()).form(&fields),
        HttpMethod::Get => client.get(form.action.clone()).query(&fields),
    };

    let body = read_counted_body(request).await?;
    if payload.is_empty() || !body.contains(payload) {
        return None;
    }

    info!(action = %form.action, method = %form.method, "Payload echoed by form.");
    Some(Finding {
        kind: FindingKind::FormXss,
        url: form.action.to_string(),
        method: form.method,
        payload: payload.to_string(),
        evidence: evidence_for(payload),
    })
}
