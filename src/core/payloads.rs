// src/core/payloads.rs

use std::path::Path;
use tracing::{debug, info, warn};

/// Built-in SQL injection payloads, used when no payload file is available.
pub const SQLI_FALLBACK: &[&str] = &["'", "\"", "1' OR '1'='1", "1' OR '1'='1' --", "' OR '1'='1' #"];

/// Built-in XSS payloads, used when no payload file is available.
pub const XSS_FALLBACK: &[&str] = &[
    "<script>alert('xss_test')</script>",
    "<img src=x onerror=alert('xss_test')>",
    "'><script>alert('xss_test')</script>",
    "<svg onload=alert('xss_test')>",
];

/// Loads an ordered payload list from `path`.
///
/// One payload per line; blank lines and `#` comments are skipped. A missing
/// or unreadable file, or one that yields no payloads, falls back to the
/// built-in list. Never fails and never returns an empty list.
pub fn load_payloads(path: &Path, fallback: &[&str]) -> Vec<String> {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) => {
            debug!(path = %path.display(), error = %e, "Payload file unavailable, using built-in set.");
            return to_owned(fallback);
        }
    };

    let payloads: Vec<String> = contents
        .lines()
        .filter(|line| !line.starts_with('#'))
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect();

    if payloads.is_empty() {
        warn!(path = %path.display(), "Payload file has no payloads, using built-in set.");
        return to_owned(fallback);
    }

    info!(path = %path.display(), count = payloads.len(), "Loaded payloads.");
    payloads
}

fn to_owned(payloads: &[&str]) -> Vec<String> {
    payloads.iter().map(|p| p.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_file_uses_fallback() {
        let payloads = load_payloads(Path::new("/definitely/not/here.txt"), SQLI_FALLBACK);
        assert_eq!(payloads, to_owned(SQLI_FALLBACK));
    }

    #[test]
    fn file_skips_comments_and_blank_lines() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "# header").unwrap();
        writeln!(file, "  ' OR 1=1 --  ").unwrap();
        writeln!(file).unwrap();
        writeln!(file, "<b>x</b>").unwrap();

        let payloads = load_payloads(file.path(), XSS_FALLBACK);
        assert_eq!(payloads, vec!["' OR 1=1 --".to_string(), "<b>x</b>".to_string()]);
    }

    #[test]
    fn loading_twice_is_identical() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "a\nb\nc").unwrap();
        assert_eq!(load_payloads(file.path(), SQLI_FALLBACK), load_payloads(file.path(), SQLI_FALLBACK));
    }

    #[test]
    fn comment_only_file_falls_back() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "# nothing here").unwrap();
        assert_eq!(load_payloads(file.path(), XSS_FALLBACK).len(), XSS_FALLBACK.len());
    }
}
