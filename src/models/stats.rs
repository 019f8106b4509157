//! Conversion statistics
//!
//! Counters accumulated across a run and read by the summary report.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Serialize;

use super::record::SourceFormat;

/// How many rows had one category rewritten, and to what
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemapTally {
    pub mapped_to: String,
    pub count: usize,
}

/// Remapping counts keyed by the original category
pub type RemapCounts = BTreeMap<String, RemapTally>;

/// Record a single remapping; unchanged categories are not tallied
pub fn track_remapping(counts: &mut RemapCounts, original: &str, mapped: &str) {
    if original == mapped {
        return;
    }
    counts
        .entry(original.to_string())
        .or_insert_with(|| RemapTally {
            mapped_to: mapped.to_string(),
            count: 0,
        })
        .count += 1;
}

/// Result of converting one file
#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    pub input: PathBuf,
    pub output: PathBuf,
    pub format: SourceFormat,
    pub transactions: usize,
    pub malformed_rows: usize,
    #[serde(skip)]
    pub remappings: RemapCounts,
}

/// Per-file outcome kept for the summary
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum FileOutcome {
    Converted(FileReport),
    Failed { input: PathBuf, reason: String },
}

/// Counters for a whole run
#[derive(Debug, Clone, Default, Serialize)]
pub struct ConversionStats {
    pub files_processed: usize,
    pub files_failed: usize,
    pub transactions_converted: usize,
    pub malformed_rows: usize,
    pub remappings: RemapCounts,
    pub files: Vec<FileOutcome>,
}

impl ConversionStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge a successfully converted file
    pub fn record_converted(&mut self, report: FileReport) {
        self.files_processed += 1;
        self.transactions_converted += report.transactions;
        self.malformed_rows += report.malformed_rows;

        for (original, tally) in &report.remappings {
            self.remappings
                .entry(original.clone())
                .or_insert_with(|| RemapTally {
                    mapped_to: tally.mapped_to.clone(),
                    count: 0,
                })
                .count += tally.count;
        }

        self.files.push(FileOutcome::Converted(report));
    }

    /// Record a file that was skipped because of an error
    pub fn record_failure(&mut self, input: PathBuf, reason: impl Into<String>) {
        self.files_failed += 1;
        self.files.push(FileOutcome::Failed {
            input,
            reason: reason.into(),
        });
    }

    /// Number of candidate files seen
    pub fn files_discovered(&self) -> usize {
        self.files_processed + self.files_failed
    }

    /// Whether any file failed
    pub fn has_failures(&self) -> bool {
        self.files_failed > 0
    }

    /// Remappings ordered by count (most frequent first), then by category
    pub fn sorted_remappings(&self) -> Vec<(&str, &RemapTally)> {
        let mut sorted: Vec<_> = self
            .remappings
            .iter()
            .map(|(original, tally)| (original.as_str(), tally))
            .collect();
        sorted.sort_by(|a, b| b.1.count.cmp(&a.1.count).then_with(|| a.0.cmp(b.0)));
        sorted
    }
}
