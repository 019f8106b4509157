//! Path management for pc2monarch
//!
//! Resolves the input, output, and configuration locations for a run and
//! derives output file names.
//!
//! ## Defaults
//!
//! All paths are relative to the current working directory:
//! `./input`, `./output` and `./config.yaml`.

use std::path::{Path, PathBuf};

use crate::error::ConvertError;

/// Suffix appended to the stem of every converted file
pub const OUTPUT_SUFFIX: &str = "-monarch";

/// Extension of input and output files
pub const CSV_EXTENSION: &str = "csv";

/// Default input directory
pub const DEFAULT_INPUT_DIR: &str = "input";

/// Default output directory
pub const DEFAULT_OUTPUT_DIR: &str = "output";

/// Default configuration file
pub const DEFAULT_CONFIG_FILE: &str = "config.yaml";

/// Manages all paths used by a conversion run
#[derive(Debug, Clone)]
pub struct ConverterPaths {
    input_dir: PathBuf,
    output_dir: PathBuf,
    config_file: PathBuf,
}

impl Default for ConverterPaths {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from(DEFAULT_INPUT_DIR),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            config_file: PathBuf::from(DEFAULT_CONFIG_FILE),
        }
    }
}

impl ConverterPaths {
    /// Create paths from explicit locations
    pub fn new(
        input_dir: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
        config_file: impl Into<PathBuf>,
    ) -> Self {
        Self {
            input_dir: input_dir.into(),
            output_dir: output_dir.into(),
            config_file: config_file.into(),
        }
    }

    /// Create paths rooted at a base directory (useful for testing)
    pub fn with_base_dir(base_dir: &Path) -> Self {
        Self {
            input_dir: base_dir.join(DEFAULT_INPUT_DIR),
            output_dir: base_dir.join(DEFAULT_OUTPUT_DIR),
            config_file: base_dir.join(DEFAULT_CONFIG_FILE),
        }
    }

    /// Directory scanned for Personal Capital exports
    pub fn input_dir(&self) -> &Path {
        &self.input_dir
    }

    /// Directory receiving the converted files
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Path to the YAML configuration
    pub fn config_file(&self) -> &Path {
        &self.config_file
    }

    /// Output path for a given input file: `<output_dir>/<stem>-monarch.csv`
    pub fn output_file_for(&self, input: &Path) -> PathBuf {
        self.output_dir.join(output_file_name(input))
    }

    /// Create the output directory if it doesn't exist
    pub fn ensure_output_dir(&self) -> Result<(), ConvertError> {
        std::fs::create_dir_all(&self.output_dir).map_err(|e| {
            ConvertError::Io(format!(
                "Failed to create output directory {}: {}",
                self.output_dir.display(),
                e
            ))
        })
    }
}

/// Derive the converted file name for an input path
pub fn output_file_name(input: &Path) -> String {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    format!("{}{}.{}", stem, OUTPUT_SUFFIX, CSV_EXTENSION)
}

/// Whether a path has a `.csv` extension (any case)
pub fn is_csv_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(CSV_EXTENSION))
}

/// Whether a path already follows the converted naming convention
pub fn is_converted_output(path: &Path) -> bool {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .is_some_and(|stem| stem.ends_with(OUTPUT_SUFFIX))
}
