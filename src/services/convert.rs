//! Conversion service
//!
//! Drives a run: discovers Personal Capital exports in the input directory,
//! detects each file's layout, transforms every row, writes the Monarch file
//! and accumulates statistics. A failing file is logged, counted and skipped.

use std::collections::HashMap;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, Writer};
use tracing::{debug, info, info_span, warn};

use crate::config::paths::{is_converted_output, is_csv_file};
use crate::config::ConverterPaths;
use crate::error::{ConvertError, ConvertResult};
use crate::models::{
    track_remapping, CategoryMapping, ConversionStats, DestinationRecord, FileReport,
    RemapCounts, SourceFormat, SourceRecord,
};
use crate::services::detect::detect_from_record;
use crate::services::transform::transform;

/// In-memory result of converting one export
#[derive(Debug, Clone)]
pub struct Conversion {
    /// Detected layout
    pub format: SourceFormat,
    /// Converted rows, same order as the input
    pub records: Vec<DestinationRecord>,
    /// Rows whose width differed from the header
    pub malformed_rows: usize,
    /// Categories rewritten in this file
    pub remappings: RemapCounts,
}

/// Service for converting exports
pub struct ConvertService<'a> {
    mapping: &'a CategoryMapping,
    dry_run: bool,
}

impl<'a> ConvertService<'a> {
    /// Create a new conversion service
    pub fn new(mapping: &'a CategoryMapping) -> Self {
        Self {
            mapping,
            dry_run: false,
        }
    }

    /// Detect and transform without writing any output
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Whether this service skips writing output files
    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// List convertible files in a directory, sorted by name
    ///
    /// Files already named `*-monarch.csv` are skipped so a previous run's
    /// output is never converted again.
    pub fn discover_input_files(input_dir: &Path) -> ConvertResult<Vec<PathBuf>> {
        if !input_dir.is_dir() {
            return Err(ConvertError::Io(format!(
                "Input directory not found: {}",
                input_dir.display()
            )));
        }

        let mut files = Vec::new();
        for entry in std::fs::read_dir(input_dir)? {
            let path = entry?.path();
            if !path.is_file() || !is_csv_file(&path) {
                continue;
            }
            if is_converted_output(&path) {
                debug!(file = %path.display(), "Skipping already converted file");
                continue;
            }
            files.push(path);
        }

        files.sort();
        Ok(files)
    }

    /// Convert the contents of an export held in memory
    pub fn convert_str(&self, content: &str) -> ConvertResult<Conversion> {
        let content = content.strip_prefix('\u{feff}').unwrap_or(content);

        let mut reader = ReaderBuilder::new()
            .flexible(true)
            .from_reader(content.as_bytes());

        let headers = reader.headers()?.clone();
        let detected = detect_from_record(&headers)?;
        let width = detected.columns.width;

        let mut records = Vec::new();
        let mut malformed_rows = 0;
        let mut remappings = RemapCounts::new();

        for result in reader.records() {
            let row = result?;

            if row.len() != width {
                malformed_rows += 1;
                warn!(
                    line = row.position().map(|p| p.line()).unwrap_or_default(),
                    expected = width,
                    found = row.len(),
                    "Row has the wrong number of fields; missing values left empty"
                );
            }

            let source = SourceRecord::from_row(detected.format, &detected.columns, &row);
            let converted = transform(&source, self.mapping);
            track_remapping(&mut remappings, source.category(), &converted.category);
            records.push(converted);
        }

        Ok(Conversion {
            format: detected.format,
            records,
            malformed_rows,
            remappings,
        })
    }

    /// Convert one file, writing the result to `output`
    pub fn convert_file(&self, input: &Path, output: &Path) -> ConvertResult<FileReport> {
        let content = std::fs::read_to_string(input).map_err(|e| {
            ConvertError::Io(format!("Failed to read {}: {}", input.display(), e))
        })?;

        let conversion = self.convert_str(&content)?;
        info!(format = %conversion.format, "Detected {} export", conversion.format);

        if self.dry_run {
            info!(output = %output.display(), "Dry run, not writing");
        } else {
            write_output_file(&conversion.records, output)?;
        }

        Ok(FileReport {
            input: input.to_path_buf(),
            output: output.to_path_buf(),
            format: conversion.format,
            transactions: conversion.records.len(),
            malformed_rows: conversion.malformed_rows,
            remappings: conversion.remappings,
        })
    }

    /// Convert every export in the input directory
    ///
    /// Errors returned from here are fatal for the run. Per-file failures
    /// are recorded in the returned statistics instead.
    pub fn run(&self, paths: &ConverterPaths) -> ConvertResult<ConversionStats> {
        let files = Self::discover_input_files(paths.input_dir())?;

        if !self.dry_run {
            paths.ensure_output_dir()?;
        }

        let mut stats = ConversionStats::new();
        // Output path -> input that produced it
        let mut written: HashMap<PathBuf, PathBuf> = HashMap::new();

        if files.is_empty() {
            warn!(
                input = %paths.input_dir().display(),
                "No Personal Capital CSV files found"
            );
            return Ok(stats);
        }

        info!(count = files.len(), "Found Personal Capital CSV file(s) to convert");

        for input in files {
            let name = input
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let _span = info_span!("file", name = %name).entered();

            let output = paths.output_file_for(&input);
            if let Some(first) = written.get(&output) {
                let reason = format!(
                    "Output {} already written from {}",
                    output.display(),
                    first.display()
                );
                warn!(output = %output.display(), "Skipping file: output name collision");
                stats.record_failure(input, reason);
                continue;
            }

            match self.convert_file(&input, &output) {
                Ok(report) => {
                    info!(
                        transactions = report.transactions,
                        output = %output.display(),
                        "Converted {} transactions",
                        report.transactions
                    );
                    written.insert(output, input);
                    stats.record_converted(report);
                }
                Err(e) => {
                    warn!(error = %e, "Skipping file");
                    stats.record_failure(input, e.to_string());
                }
            }
        }

        Ok(stats)
    }
}

/// Write `records` to `output` through a temporary sibling file
///
/// The sibling is renamed into place only after a complete write and is
/// removed on any error.
fn write_output_file(records: &[DestinationRecord], output: &Path) -> ConvertResult<()> {
    let partial = output.with_extension("csv.tmp");

    let result = File::create(&partial)
        .map_err(|e| ConvertError::Io(format!("Failed to create {}: {}", partial.display(), e)))
        .and_then(|file| write_monarch_csv(records, file))
        .and_then(|()| {
            std::fs::rename(&partial, output).map_err(|e| {
                ConvertError::Io(format!("Failed to write {}: {}", output.display(), e))
            })
        });

    if result.is_err() {
        let _ = std::fs::remove_file(&partial);
    }
    result
}

/// Write Monarch rows with the fixed header
///
/// The header is written even when there are no rows.
pub fn write_monarch_csv<W: Write>(records: &[DestinationRecord], writer: W) -> ConvertResult<()> {
    let mut writer = Writer::from_writer(writer);
    writer.write_record(DestinationRecord::HEADER)?;
    for record in records {
        writer.write_record(record.fields())?;
    }
    writer
        .flush()
        .map_err(|e| ConvertError::Io(format!("Failed to write output: {}", e)))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::models::FileOutcome;
    use tempfile::TempDir;

    const STANDARD_HEADER: &str = "Date,Description,Category,Tags,Amount\n";

    fn mapping() -> CategoryMapping {
        Settings::builtin().category_mapping().unwrap()
    }

    fn setup() -> (TempDir, ConverterPaths) {
        let temp_dir = TempDir::new().unwrap();
        let paths = ConverterPaths::with_base_dir(temp_dir.path());
        std::fs::create_dir_all(paths.input_dir()).unwrap();
        (temp_dir, paths)
    }

    fn write_input(paths: &ConverterPaths, name: &str, content: &str) -> PathBuf {
        let path = paths.input_dir().join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    fn to_string(records: &[DestinationRecord]) -> String {
        let mut buf = Vec::new();
        write_monarch_csv(records, &mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_grand_gas_scenario() {
        let mapping = mapping();
        let service = ConvertService::new(&mapping);
        let input = format!(
            "{}2024-06-27,\"Grand Gas Union San Jose Ca\",\"Gasoline/Fuel\",,-48.92\n",
            STANDARD_HEADER
        );

        let conversion = service.convert_str(&input).unwrap();
        assert_eq!(conversion.format, SourceFormat::Standard);

        let output = to_string(&conversion.records);
        let mut lines = output.lines();
        assert_eq!(
            lines.next(),
            Some("Date,Merchant,Category,Account,Original Statement,Notes,Amount,Tags")
        );
        assert_eq!(
            lines.next(),
            Some("2024-06-27,Grand Gas Union San Jose Ca,Gas,,Grand Gas Union San Jose Ca,,-48.92,")
        );
        assert_eq!(lines.next(), None);
        assert_eq!(conversion.remappings["Gasoline/Fuel"].count, 1);
    }

    #[test]
    fn test_header_only_produces_header_only() {
        let mapping = mapping();
        let conversion = ConvertService::new(&mapping)
            .convert_str(STANDARD_HEADER)
            .unwrap();

        assert!(conversion.records.is_empty());
        assert!(conversion.remappings.is_empty());
        assert_eq!(
            to_string(&conversion.records),
            "Date,Merchant,Category,Account,Original Statement,Notes,Amount,Tags\n"
        );
    }

    #[test]
    fn test_investment_notes_from_action() {
        let mapping = mapping();
        let input = "Date,Description,Category,Action,Quantity,Price,Amount\n\
                     2024-03-01,VANGUARD TOTAL STOCK,Stocks,Buy,10,250.00,-2500.00\n\
                     2024-03-15,VANGUARD TOTAL STOCK,Dividends Received,Dividend,,,12.34\n";

        let conversion = ConvertService::new(&mapping).convert_str(input).unwrap();
        assert_eq!(conversion.format, SourceFormat::Investment);
        assert_eq!(conversion.records[0].notes, "Buy");
        assert_eq!(conversion.records[1].notes, "Dividend");
        assert_eq!(conversion.records[1].category, "Dividends & Capital Gains");
    }

    #[test]
    fn test_row_count_preserved_with_quotes_and_accents() {
        let mapping = mapping();
        let input = format!(
            "{}{}{}{}",
            STANDARD_HEADER,
            "2024-01-01,\"McDonald's, Inc. & \"\"Big Store\"\"\",Restaurants,,-9.99\n",
            "2024-01-02,Café Délicieux,Restaurants,\"organic,weekly\",-4.50\n",
            "2024-01-03,Big Box Store,Shopping,,0.00\n",
        );

        let conversion = ConvertService::new(&mapping).convert_str(&input).unwrap();
        assert_eq!(conversion.records.len(), 3);
        assert_eq!(conversion.records[0].merchant, "McDonald's, Inc. & \"Big Store\"");
        assert_eq!(conversion.records[1].merchant, "Café Délicieux");
        assert_eq!(conversion.records[1].tags, "organic,weekly");

        let output = to_string(&conversion.records);
        let mut reader = csv::Reader::from_reader(output.as_bytes());
        assert_eq!(reader.records().count(), 3);
    }

    #[test]
    fn test_malformed_rows_are_kept() {
        let mapping = mapping();
        let input = format!(
            "{}2024-01-15,Test Transaction\n2024-01-16,Extra,Travel,,-1.00,surplus\n",
            STANDARD_HEADER
        );

        let conversion = ConvertService::new(&mapping).convert_str(&input).unwrap();
        assert_eq!(conversion.records.len(), 2);
        assert_eq!(conversion.malformed_rows, 2);
        assert_eq!(conversion.records[0].amount, "");
        assert_eq!(conversion.records[1].category, "Travel & Vacation");
        assert_eq!(conversion.records[1].amount, "-1.00");
    }

    #[test]
    fn test_byte_order_mark_stripped() {
        let mapping = mapping();
        let input = format!("\u{feff}{}2024-01-15,Shop,Travel,,-1.00\n", STANDARD_HEADER);
        let conversion = ConvertService::new(&mapping).convert_str(&input).unwrap();
        assert_eq!(conversion.records[0].date, "2024-01-15");
    }

    #[test]
    fn test_unknown_header_fails() {
        let mapping = mapping();
        let err = ConvertService::new(&mapping)
            .convert_str("Description,Category\nShop,Travel\n")
            .unwrap_err();
        assert!(err.is_detection());
    }

    #[test]
    fn test_empty_file_fails_detection() {
        let mapping = mapping();
        let err = ConvertService::new(&mapping).convert_str("").unwrap_err();
        assert!(err.is_detection());
    }

    #[test]
    fn test_discover_skips_converted_and_non_csv() {
        let (_temp_dir, paths) = setup();
        write_input(&paths, "b.csv", STANDARD_HEADER);
        write_input(&paths, "a.CSV", STANDARD_HEADER);
        write_input(&paths, "a-monarch.csv", STANDARD_HEADER);
        write_input(&paths, "notes.txt", "hello");
        std::fs::create_dir(paths.input_dir().join("dir.csv")).unwrap();

        let files = ConvertService::discover_input_files(paths.input_dir()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.CSV", "b.csv"]);
    }

    #[test]
    fn test_discover_missing_directory() {
        let temp_dir = TempDir::new().unwrap();
        let err = ConvertService::discover_input_files(&temp_dir.path().join("nope")).unwrap_err();
        assert!(err.to_string().contains("Input directory not found"));
    }

    #[test]
    fn test_run_continues_past_bad_file() {
        let (_temp_dir, paths) = setup();
        write_input(
            &paths,
            "checking.csv",
            &format!("{}2024-06-27,Grand Gas,Gasoline/Fuel,,-48.92\n", STANDARD_HEADER),
        );
        write_input(&paths, "broken.csv", "Description,Category,Tags\nShop,Travel,\n");

        let mapping = mapping();
        let stats = ConvertService::new(&mapping).run(&paths).unwrap();

        assert_eq!(stats.files_processed, 1);
        assert_eq!(stats.files_failed, 1);
        assert_eq!(stats.transactions_converted, 1);
        assert!(paths.output_dir().join("checking-monarch.csv").exists());
        assert!(!paths.output_dir().join("broken-monarch.csv").exists());
        assert!(stats.files.iter().any(|f| matches!(
            f,
            FileOutcome::Failed { reason, .. } if reason.contains("Date")
        )));
    }

    #[test]
    fn test_run_invalid_utf8_is_file_failure() {
        let (_temp_dir, paths) = setup();
        std::fs::write(paths.input_dir().join("latin1.csv"), b"Date,Description\xff\n").unwrap();

        let mapping = mapping();
        let stats = ConvertService::new(&mapping).run(&paths).unwrap();
        assert_eq!(stats.files_failed, 1);
        assert_eq!(stats.files_processed, 0);
    }

    #[test]
    fn test_run_is_idempotent_when_output_is_input() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("data");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(
            dir.join("savings.csv"),
            format!("{}2024-01-01,Interest,Investment Income,,1.23\n", STANDARD_HEADER),
        )
        .unwrap();
        let paths = ConverterPaths::new(&dir, &dir, temp_dir.path().join("config.yaml"));

        let mapping = mapping();
        let service = ConvertService::new(&mapping);
        let first = service.run(&paths).unwrap();
        let second = service.run(&paths).unwrap();

        assert_eq!(first.files_processed, 1);
        assert_eq!(second.files_processed, 1);
        assert!(!dir.join("savings-monarch-monarch.csv").exists());
    }

    #[test]
    fn test_dry_run_writes_nothing() {
        let (_temp_dir, paths) = setup();
        write_input(
            &paths,
            "checking.csv",
            &format!("{}2024-01-01,Shop,Travel,,-5.00\n", STANDARD_HEADER),
        );

        let mapping = mapping();
        let service = ConvertService::new(&mapping).with_dry_run(true);
        assert!(service.is_dry_run());

        let stats = service.run(&paths).unwrap();
        assert_eq!(stats.transactions_converted, 1);
        assert!(!paths.output_dir().exists());
    }

    #[test]
    fn test_run_rejects_case_variant_output_collision() {
        let (_temp_dir, paths) = setup();
        write_input(
            &paths,
            "a.CSV",
            &format!("{}2024-01-01,FIRST,Travel,,-1.00\n", STANDARD_HEADER),
        );
        write_input(
            &paths,
            "a.csv",
            &format!("{}2024-01-02,SECOND,Travel,,-2.00\n", STANDARD_HEADER),
        );

        let mapping = mapping();
        let stats = ConvertService::new(&mapping).run(&paths).unwrap();

        assert_eq!(stats.files_processed, 1);
        assert_eq!(stats.files_failed, 1);
        assert_eq!(stats.transactions_converted, 1);
        assert!(stats.files.iter().any(|f| matches!(
            f,
            FileOutcome::Failed { input, reason }
                if input.ends_with("a.csv") && reason.contains("a-monarch.csv")
        )));

        let output = std::fs::read_to_string(paths.output_dir().join("a-monarch.csv")).unwrap();
        assert!(output.contains("FIRST"));
        assert!(!output.contains("SECOND"));
    }

    #[test]
    fn test_failed_write_leaves_no_partial_output() {
        let (_temp_dir, paths) = setup();
        write_input(
            &paths,
            "checking.csv",
            &format!("{}2024-01-01,Shop,Travel,,-5.00\n", STANDARD_HEADER),
        );
        // A directory squatting on the output name makes the final rename fail
        std::fs::create_dir_all(paths.output_dir().join("checking-monarch.csv")).unwrap();

        let mapping = mapping();
        let stats = ConvertService::new(&mapping).run(&paths).unwrap();

        assert_eq!(stats.files_failed, 1);
        assert_eq!(stats.files_processed, 0);
        assert!(paths.output_dir().join("checking-monarch.csv").is_dir());
        let leftovers: Vec<_> = std::fs::read_dir(paths.output_dir())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(leftovers, vec![std::ffi::OsString::from("checking-monarch.csv")]);
    }

    #[test]
    fn test_write_replaces_previous_output() {
        let temp_dir = TempDir::new().unwrap();
        let output = temp_dir.path().join("checking-monarch.csv");
        std::fs::write(&output, "stale contents that are longer than the new file\n").unwrap();

        write_output_file(&[], &output).unwrap();

        assert_eq!(
            std::fs::read_to_string(&output).unwrap(),
            "Date,Merchant,Category,Account,Original Statement,Notes,Amount,Tags\n"
        );
        assert!(!temp_dir.path().join("checking-monarch.csv.tmp").exists());
    }

    #[test]
    fn test_run_with_empty_input_dir() {
        let (_temp_dir, paths) = setup();
        let mapping = mapping();
        let stats = ConvertService::new(&mapping).run(&paths).unwrap();
        assert_eq!(stats.files_discovered(), 0);
        assert!(!stats.has_failures());
    }
}
