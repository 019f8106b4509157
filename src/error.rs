//! Custom error types for pc2monarch
//!
//! This module defines the error hierarchy for the converter using thiserror
//! for ergonomic error definitions.

use thiserror::Error;

/// The main error type for conversion operations
#[derive(Error, Debug)]
pub enum ConvertError {
    /// Configuration-related errors (missing file, bad YAML, duplicate keys)
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// CSV parsing or writing errors
    #[error("CSV error: {0}")]
    Csv(String),

    /// The header matched neither known export layout
    #[error("Unrecognized export format: missing required column(s) {}", .missing.join(", "))]
    Detection { missing: Vec<String> },

    /// Run report errors
    #[error("Report error: {0}")]
    Report(String),
}

impl ConvertError {
    /// Create a detection error from the list of missing column names
    pub fn missing_columns<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Detection {
            missing: columns.into_iter().map(Into::into).collect(),
        }
    }

    /// Check if this is a configuration error
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }

    /// Check if this is a format detection error
    pub fn is_detection(&self) -> bool {
        matches!(self, Self::Detection { .. })
    }
}

// Implement From traits for common error types

impl From<std::io::Error> for ConvertError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<csv::Error> for ConvertError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err.to_string())
    }
}

impl From<serde_yaml::Error> for ConvertError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<serde_json::Error> for ConvertError {
    fn from(err: serde_json::Error) -> Self {
        Self::Report(err.to_string())
    }
}

/// Result type alias for conversion operations
pub type ConvertResult<T> = Result<T, ConvertError>;
