//! Export module for pc2monarch
//!
//! Provides the machine-readable JSON report of a conversion run.

pub mod json;

pub use json::{export_run_report, write_run_report, RunReport, REPORT_SCHEMA_VERSION};
