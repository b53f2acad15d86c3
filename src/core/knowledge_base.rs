//! Static, read-only detail for every finding type the probes can raise:
//! a human-readable explanation and remediation steps. Keeping it
//! data-driven keeps the probes free of presentation text.

use crate::core::models::FindingKind;
use std::fmt;

/// High-level grouping of findings, used for titles in the interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum FindingCategory {
    /// Script injection into pages served back to the browser.
    CrossSiteScripting,
    /// Injection into database queries.
    Injection,
}

impl fmt::Display for FindingCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FindingCategory::CrossSiteScripting => write!(f, "Cross-Site Scripting"),
            FindingCategory::Injection => write!(f, "SQL Injection"),
        }
    }
}

/// Everything needed to present one finding type to a user.
pub struct FindingDetail {
    pub kind: FindingKind,
    pub title: &'static str,
    pub category: FindingCategory,
    /// CWE identifier of the weakness class.
    pub cwe: &'static str,
    pub description: &'static str,
    pub remediation: &'static str,
}

static FINDINGS: &[FindingDetail] = &[
    FindingDetail {
        kind: FindingKind::ReflectedXss,
        title: "Reflected Cross-Site Scripting",
        category: FindingCategory::CrossSiteScripting,
        cwe: "CWE-79",
        description: "A value sent in a URL parameter came back as page text without being neutralized. An attacker can craft a link that runs script in the victim's browser under this site's origin.",
        remediation: "Encode every user-supplied value for the context it is written into (HTML body, attribute, script). Prefer a templating engine with automatic escaping and add a Content-Security-Policy.",
    },
    FindingDetail {
        kind: FindingKind::FormXss,
        title: "Cross-Site Scripting in Form",
        category: FindingCategory::CrossSiteScripting,
        cwe: "CWE-79",
        description: "A value submitted through a form was echoed verbatim in the response. Markup injected through the form can execute in the browser of whoever views the result.",
        remediation: "Validate form input on the server and encode it on output. Never concatenate raw submitted values into HTML responses.",
    },
    FindingDetail {
        kind: FindingKind::SqlInjection,
        title: "SQL Injection",
        category: FindingCategory::Injection,
        cwe: "CWE-89",
        description: "A crafted parameter value produced a database error message in the response, which shows the value reached a SQL query unescaped. Attackers can often read or modify data through this flaw.",
        remediation: "Use parameterized queries or prepared statements for every database call, and stop returning raw database errors to clients.",
    },
];

/// Looks up the detail for a finding type.
pub fn get_finding_detail(kind: FindingKind) -> Option<&'static FindingDetail> {
    FINDINGS.iter().find(|f| f.kind == kind)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_finding_type_is_documented() {
        for kind in [FindingKind::ReflectedXss, FindingKind::FormXss, FindingKind::SqlInjection] {
            let detail = get_finding_detail(kind).expect("missing knowledge base entry");
            assert!(!detail.remediation.is_empty());
        }
        assert_eq!(get_finding_detail(FindingKind::SqlInjection).map(|d| d.cwe), Some("CWE-89"));
    }
}
