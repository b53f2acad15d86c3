// src/ui/widgets/mod.rs

// Module declarations for every UI widget.
pub mod analysis_view; // Finding list with knowledge-base detail.
pub mod disclaimer_popup;
pub mod footer;
pub mod input;
pub mod results; // Results panel: host table or finding list.
pub mod summary; // Progress and scan totals.
