// src/lib.rs

//! Scan engine for two reconnaissance pipelines: link-layer host discovery
//! with per-host enrichment, and SQL injection / XSS probing of a web target.

pub mod config;
pub mod core;
pub mod logging;

pub use crate::config::ScanConfig;
pub use crate::core::error::ScanError;
pub use crate::core::scanner::Orchestrator;
