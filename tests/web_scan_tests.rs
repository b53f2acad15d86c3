// tests/web_scan_tests.rs

use mockito::{Matcher, Server};
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tokio::net::TcpListener;
use vanguard_recon::core::models::{FindingKind, HttpMethod, ScanOutcome, ScanPhase};
use vanguard_recon::{Orchestrator, ScanConfig, ScanError};

const MYSQL_ERROR_PAGE: &str =
    "You have an error in your SQL syntax; check the manual that corresponds to your MySQL server";

fn write_payloads(dir: &Path, name: &str, payloads: &[&str]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, format!("# test payloads\n{}\n", payloads.join("\n"))).unwrap();
    path
}

fn test_config(dir: &TempDir, sqli: &[&str], xss: &[&str]) -> ScanConfig {
    ScanConfig {
        workers: 4,
        request_delay_ms: 0,
        request_timeout_secs: 2,
        sqli_payloads: Some(write_payloads(dir.path(), "sqli.txt", sqli)),
        xss_payloads: Some(write_payloads(dir.path(), "xss.txt", xss)),
        report_dir: Some(dir.path().join("reports")),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_sql_error_in_response_yields_one_finding() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", Matcher::Any)
        .with_status(200)
        .with_body(MYSQL_ERROR_PAGE)
        .create_async()
        .await;

    let dir = TempDir::new().unwrap();
    let payload = "1' OR '1'='1' --";
    let config = test_config(&dir, &[payload], &["<script>alert('xss_test')</script>"]);
    let orchestrator = Orchestrator::new(config);

    let target = format!("{}/item.php?id=1", server.url());
    let report = orchestrator.scan_target(&target).await.unwrap();

    assert_eq!(report.vulnerabilities_found, 1);
    let finding = &report.findings[0];
    assert_eq!(finding.kind, FindingKind::SqlInjection);
    assert_eq!(finding.method, HttpMethod::Get);
    assert_eq!(finding.payload, payload);
    assert_eq!(finding.evidence, "SQL error message detected");
    assert!(finding.url.contains("id=1%27+OR+%271%27%3D%271%27+--"), "{}", finding.url);

    let status = orchestrator.poll();
    assert!(!status.scanning);
    assert!(status.has_results);
    assert_eq!(status.progress, 100);

    let saved: Vec<_> = std::fs::read_dir(dir.path().join("reports")).unwrap().collect();
    assert_eq!(saved.len(), 1);
}

#[tokio::test]
async fn test_form_echo_yields_form_xss_finding() {
    let mut server = Server::new_async().await;
    let payload = "<script>alert(1)</script>";
    let _page = server
        .mock("GET", "/")
        .with_status(200)
        .with_body(r#"<html><body><form method="POST" action="/search"><input name="q"></form></body></html>"#)
        .create_async()
        .await;
    let echo = server
        .mock("POST", "/search")
        .match_body(Matcher::UrlEncoded("q".into(), payload.into()))
        .with_status(200)
        .with_body(format!("<p>Results for {}</p>", payload))
        .create_async()
        .await;

    let dir = TempDir::new().unwrap();
    let orchestrator = Orchestrator::new(test_config(&dir, &["'"], &[payload]));
    let report = orchestrator.scan_target(&format!("{}/", server.url())).await.unwrap();

    assert_eq!(report.findings.len(), 1);
    let finding = &report.findings[0];
    assert_eq!(finding.kind, FindingKind::FormXss);
    assert_eq!(finding.method, HttpMethod::Post);
    assert_eq!(finding.url, format!("{}/search", server.url()));
    assert_eq!(finding.evidence, format!("{}...", payload));
    echo.assert_async().await;
}

#[tokio::test]
async fn test_session_cookie_follows_reflected_xss_requests() {
    let mut server = Server::new_async().await;
    let payload = "xss_marker_42";
    let _page = server
        .mock("GET", Matcher::Regex("^/page".into()))
        .match_query(Matcher::UrlEncoded("q".into(), "hello".into()))
        .with_status(200)
        .with_header("set-cookie", "sid=abc; Path=/")
        .with_body("<html><body><p>Nothing to see</p></body></html>")
        .create_async()
        .await;
    let reflected = server
        .mock("GET", Matcher::Regex("^/page".into()))
        .match_query(Matcher::UrlEncoded("q".into(), payload.into()))
        .match_header("cookie", "sid=abc")
        .with_status(200)
        .with_body(format!("<html><body><p>You searched for {}</p></body></html>", payload))
        .expect(1)
        .create_async()
        .await;

    let dir = TempDir::new().unwrap();
    let orchestrator = Orchestrator::new(test_config(&dir, &["'"], &[payload]));
    let report = orchestrator
        .scan_target(&format!("{}/page?q=hello", server.url()))
        .await
        .unwrap();

    assert_eq!(report.findings.len(), 1);
    let finding = &report.findings[0];
    assert_eq!(finding.kind, FindingKind::ReflectedXss);
    assert_eq!(finding.method, HttpMethod::Get);
    assert_eq!(finding.payload, payload);
    assert!(finding.url.contains("q=xss_marker_42"), "{}", finding.url);
    reflected.assert_async().await;
}

#[tokio::test]
async fn test_error_status_probe_responses_are_ignored() {
    let mut server = Server::new_async().await;
    let _page = server
        .mock("GET", "/")
        .with_status(200)
        .with_body(r#"<form action="/login"><input name="user"></form>"#)
        .create_async()
        .await;
    let _login = server
        .mock("GET", Matcher::Regex("^/login".into()))
        .with_status(500)
        .with_body("<i>echo</i>")
        .create_async()
        .await;

    let dir = TempDir::new().unwrap();
    let orchestrator = Orchestrator::new(test_config(&dir, &["'"], &["<i>echo</i>"]));
    let report = orchestrator.scan_target(&format!("{}/", server.url())).await.unwrap();
    assert_eq!(report.vulnerabilities_found, 0);
}

#[tokio::test]
async fn test_page_without_inputs_is_a_clean_done_scan() {
    let mut server = Server::new_async().await;
    let _page = server
        .mock("GET", "/")
        .with_status(200)
        .with_body("<html><body><h1>Static</h1></body></html>")
        .create_async()
        .await;

    let dir = TempDir::new().unwrap();
    let orchestrator = Orchestrator::new(test_config(&dir, &["'"], &["<x>"]));
    let report = orchestrator.scan_target(&format!("{}/", server.url())).await.unwrap();

    assert!(report.findings.is_empty());
    let snapshot = orchestrator.snapshot();
    assert_eq!(snapshot.phase, ScanPhase::Done);
    assert!(matches!(snapshot.results, Some(ScanOutcome::Vulnerabilities(_))));
}

#[tokio::test]
async fn test_refused_connection_is_reported_as_connection_failure() {
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap().port()
    };

    let dir = TempDir::new().unwrap();
    let orchestrator = Orchestrator::new(test_config(&dir, &["'"], &["<x>"]));
    let err = orchestrator
        .scan_target(&format!("http://127.0.0.1:{}/?id=1", port))
        .await
        .unwrap_err();

    assert!(matches!(err, ScanError::ConnectionFailed(_)), "{:?}", err);
    let snapshot = orchestrator.snapshot();
    assert_eq!(snapshot.phase, ScanPhase::Error);
    assert!(snapshot.message.starts_with("Error: Connection failed"));
    assert!(snapshot.results.is_none());
}

#[tokio::test]
async fn test_silent_target_is_reported_as_timeout() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let _holder = tokio::spawn(async move {
        let mut open = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            open.push(socket);
        }
    });

    let dir = TempDir::new().unwrap();
    let config = ScanConfig { request_timeout_secs: 1, ..test_config(&dir, &["'"], &["<x>"]) };
    let orchestrator = Orchestrator::new(config);
    let err = orchestrator.scan_target(&format!("http://{}/", addr)).await.unwrap_err();

    assert!(matches!(err, ScanError::Timeout(_)), "{:?}", err);
    assert_eq!(orchestrator.poll().message, "Error: Connection timed out after 1 seconds");
}

#[tokio::test]
async fn test_invalid_url_is_rejected_before_the_scan_starts() {
    let orchestrator = Orchestrator::new(ScanConfig::default());
    let err = orchestrator.start_web_scan("ftp://example.com").unwrap_err();
    assert!(matches!(err, ScanError::Config(_)));

    let status = orchestrator.poll();
    assert!(!status.scanning);
    assert_eq!(status.progress, 0);
    assert!(status.message.is_empty());
}
