//! JSON run report
//!
//! Writes a machine-readable summary of a conversion run with schema
//! versioning.

use std::io::Write;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::{ConvertError, ConvertResult};
use crate::models::{ConversionStats, FileOutcome};

/// Current report schema version
pub const REPORT_SCHEMA_VERSION: &str = "1.0.0";

/// One remapping line of the report
#[derive(Debug, Clone, Serialize)]
pub struct RemapEntry {
    pub original: String,
    pub mapped_to: String,
    pub count: usize,
}

/// Full run report structure
#[derive(Debug, Clone, Serialize)]
pub struct RunReport<'a> {
    /// Schema version for compatibility checking
    pub schema_version: &'static str,

    /// Report timestamp
    pub generated_at: DateTime<Utc>,

    /// Application version that produced the report
    pub app_version: &'static str,

    /// Whether output files were written
    pub dry_run: bool,

    pub files_processed: usize,
    pub files_failed: usize,
    pub transactions_converted: usize,
    pub malformed_rows: usize,

    /// Remappings, most frequent first
    pub remappings: Vec<RemapEntry>,

    /// Per-file outcomes in processing order
    pub files: &'a [FileOutcome],
}

impl<'a> RunReport<'a> {
    /// Build a report from run statistics
    pub fn from_stats(stats: &'a ConversionStats, dry_run: bool) -> Self {
        let remappings = stats
            .sorted_remappings()
            .into_iter()
            .map(|(original, tally)| RemapEntry {
                original: original.to_string(),
                mapped_to: tally.mapped_to.clone(),
                count: tally.count,
            })
            .collect();

        Self {
            schema_version: REPORT_SCHEMA_VERSION,
            generated_at: Utc::now(),
            app_version: env!("CARGO_PKG_VERSION"),
            dry_run,
            files_processed: stats.files_processed,
            files_failed: stats.files_failed,
            transactions_converted: stats.transactions_converted,
            malformed_rows: stats.malformed_rows,
            remappings,
            files: &stats.files,
        }
    }
}

/// Write the run report as pretty-printed JSON
pub fn export_run_report<W: Write>(
    stats: &ConversionStats,
    dry_run: bool,
    writer: &mut W,
) -> ConvertResult<()> {
    let report = RunReport::from_stats(stats, dry_run);
    serde_json::to_writer_pretty(&mut *writer, &report)?;
    writeln!(writer).map_err(|e| ConvertError::Report(e.to_string()))?;
    Ok(())
}

/// Write the run report to a file
pub fn write_run_report(stats: &ConversionStats, dry_run: bool, path: &Path) -> ConvertResult<()> {
    let mut file = std::fs::File::create(path).map_err(|e| {
        ConvertError::Report(format!("Failed to create {}: {}", path.display(), e))
    })?;
    export_run_report(stats, dry_run, &mut file)
}
