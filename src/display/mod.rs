//! Display formatting for terminal output
//!
//! Formats run statistics for the end-of-run summary.

pub mod report;

pub use report::{format_count, format_remapping_table, format_summary};
