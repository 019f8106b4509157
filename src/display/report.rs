//! Run summary formatting for terminal output
//!
//! Renders the end-of-run summary: file and transaction counts, per-file
//! failures, and the category remapping table.

use std::path::Path;

use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::models::{ConversionStats, FileOutcome};

#[derive(Tabled)]
struct RemapRow<'a> {
    #[tabled(rename = "Transactions")]
    count: String,
    #[tabled(rename = "Personal Capital")]
    original: &'a str,
    #[tabled(rename = "Monarch")]
    mapped_to: &'a str,
}

/// Format a count with thousands separators
pub fn format_count(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Format the category remapping table, or `None` when nothing was remapped
pub fn format_remapping_table(stats: &ConversionStats) -> Option<String> {
    let sorted = stats.sorted_remappings();
    if sorted.is_empty() {
        return None;
    }

    let rows = sorted.into_iter().map(|(original, tally)| RemapRow {
        count: format_count(tally.count),
        original,
        mapped_to: &tally.mapped_to,
    });

    let mut table = Table::new(rows);
    table.with(Style::rounded());
    Some(table.to_string())
}

/// Format the full run summary
pub fn format_summary(stats: &ConversionStats, output_dir: &Path, dry_run: bool) -> String {
    let mut output = String::new();

    if stats.files_discovered() == 0 {
        output.push_str("No Personal Capital CSV files found.\n");
        output.push_str("Place your Personal Capital transaction exports (.csv) in the input directory.\n");
        return output;
    }

    output.push_str(if dry_run {
        "Dry run complete (no files written)\n"
    } else {
        "Migration complete!\n"
    });
    output.push_str(&format!("{}\n", "=".repeat(40)));
    output.push_str(&format!(
        "  Files converted:      {}/{}\n",
        stats.files_processed,
        stats.files_discovered()
    ));
    output.push_str(&format!(
        "  Transactions:         {}\n",
        format_count(stats.transactions_converted)
    ));
    if stats.malformed_rows > 0 {
        output.push_str(&format!(
            "  Malformed rows:       {}\n",
            format_count(stats.malformed_rows)
        ));
    }
    if !dry_run {
        output.push_str(&format!("  Output directory:     {}\n", output_dir.display()));
    }

    let failures: Vec<_> = stats
        .files
        .iter()
        .filter_map(|outcome| match outcome {
            FileOutcome::Failed { input, reason } => Some((input, reason)),
            FileOutcome::Converted(_) => None,
        })
        .collect();
    if !failures.is_empty() {
        output.push_str("\nFailed files:\n");
        for (input, reason) in failures {
            let name = input
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| input.display().to_string());
            output.push_str(&format!("  {}: {}\n", name, reason));
        }
    }

    if let Some(table) = format_remapping_table(stats) {
        output.push_str("\nCategory Remapping Summary:\n");
        output.push_str(&table);
        output.push('\n');
    }

    if !dry_run && stats.files_processed > 0 {
        output.push_str("\nNext steps:\n");
        output.push_str("  1. Review the converted files in the output directory\n");
        output.push_str("  2. In Monarch, open each account and choose Edit > Upload transactions\n");
        output.push_str("  3. Upload the matching *-monarch.csv file\n");
        output.push_str("  4. Assign the account during import (the Account column is left empty)\n");
    }

    output
}
