// src/core/scanner/sqli_scanner.rs

use crate::core::models::{Finding, FindingKind, HttpMethod};
use crate::core::scanner::web_scanner::read_counted_body;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::info;
use url::Url;

pub const SQLI_EVIDENCE: &str = "SQL error message detected";

// --- Database Error Signatures ---
static RE_MYSQL_SYNTAX: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)SQL syntax.*MySQL").unwrap());
static RE_MYSQL_WARNING: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)Warning.*mysql_.*").unwrap());
static RE_MARIADB_SYNTAX: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)SQL syntax.*MariaDB").unwrap());
static RE_POSTGRES_ERROR: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)PostgreSQL.*ERROR").unwrap());
static RE_ORACLE_CODE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)ORA-[0-9]{5}").unwrap());
static RE_SQLITE_ERROR: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)SQLite.*error").unwrap());
static RE_MSSQL_ERROR: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)Microsoft SQL Server.*[0-9a-fA-F]{8}").unwrap());
static RE_UNCLOSED_QUOTE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)Unclosed quotation mark").unwrap());
static RE_UNTERMINATED_STRING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)quoted string not properly terminated").unwrap());

static SQL_ERROR_SIGNATURES: [(&str, &Lazy<Regex>); 9] = [
    ("MySQL", &RE_MYSQL_SYNTAX),
    ("MySQL", &RE_MYSQL_WARNING),
    ("MariaDB", &RE_MARIADB_SYNTAX),
    ("PostgreSQL", &RE_POSTGRES_ERROR),
    ("Oracle", &RE_ORACLE_CODE),
    ("SQLite", &RE_SQLITE_ERROR),
    ("SQL Server", &RE_MSSQL_ERROR),
    ("generic", &RE_UNCLOSED_QUOTE),
    ("generic", &RE_UNTERMINATED_STRING),
];

/// Names the database family whose error text appears in `body`, if any.
pub fn detect_sql_error(body: &str) -> Option<&'static str> {
    SQL_ERROR_SIGNATURES
        .iter()
        .find(|(_, re)| re.is_match(body))
        .map(|(engine, _)| *engine)
}

pub fn has_sql_error(body: &str) -> bool {
    detect_sql_error(body).is_some()
}

/// Issues one GET against `probe_url` (the target with `payload` substituted
/// into one parameter) and reports a finding when a database error leaks back.
pub async fn probe_sqli(client: &reqwest::Client, probe_url: &Url, payload: &str) -> Option<Finding> {
    let body = read_counted_body(client.get(probe_url.clone())).await?;
    let engine = detect_sql_error(&body)?;

    info!(url = %probe_url, engine, payload, "SQL error signature in probe response.");
    Some(Finding {
        kind: FindingKind::SqlInjection,
        url: probe_url.to_string(),
        method: HttpMethod::Get,
        payload: payload.to_string(),
        evidence: SQLI_EVIDENCE.to_string(),
    })
}
