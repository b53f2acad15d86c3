// src/core/mod.rs

// Root of the scan engine. The front-end only talks to the orchestrator in
// `scanner` and to the data types in `models`.

/// Data structures shared by both pipelines: host records, findings, the
/// report envelope and the scan status record.
pub mod models;

pub mod error;

/// Local network detection, subnet parsing, target URL validation and
/// attack-surface extraction.
pub mod resolver;

pub mod payloads;

/// Bounded fan-out of independent work items.
pub mod scheduler;

pub mod status;

/// Host enrichment and injection probes, plus the orchestrator that sequences
/// them.
pub mod scanner;

pub mod report;

/// Explanations and remediation advice for every finding type.
pub mod knowledge_base;
