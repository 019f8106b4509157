//! Converter settings
//!
//! Loads the YAML configuration document holding the category mapping table
//! and the advanced matching options.

use std::path::Path;

use serde::Deserialize;
use serde_yaml::{Mapping, Value};

use crate::error::ConvertError;
use crate::models::CategoryMapping;

/// The configuration shipped with pc2monarch, also written by `--init-config`
pub const DEFAULT_CONFIG: &str = include_str!("../../config.yaml");

/// Advanced matching options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
pub struct AdvancedSettings {
    /// Match categories exactly instead of ignoring case
    #[serde(default)]
    pub case_sensitive_matching: bool,
}

/// Settings read from `config.yaml`
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Settings {
    /// Raw category mapping section, keyed by Personal Capital category
    ///
    /// Required; a document without this section fails to parse.
    pub category_mappings: Mapping,

    /// Advanced options
    #[serde(default)]
    pub advanced: AdvancedSettings,
}

impl Settings {
    /// Load settings from a YAML file
    ///
    /// A missing or unparsable file is a configuration error.
    pub fn load(path: &Path) -> Result<Self, ConvertError> {
        if !path.exists() {
            return Err(ConvertError::Config(format!(
                "Configuration file not found: {}",
                path.display()
            )));
        }

        let contents = std::fs::read_to_string(path).map_err(|e| {
            ConvertError::Config(format!(
                "Failed to read configuration file {}: {}",
                path.display(),
                e
            ))
        })?;

        Self::from_yaml(&contents).map_err(|e| match e {
            ConvertError::Config(msg) => {
                ConvertError::Config(format!("{}: {}", path.display(), msg))
            }
            other => other,
        })
    }

    /// Parse settings from a YAML string
    pub fn from_yaml(contents: &str) -> Result<Self, ConvertError> {
        serde_yaml::from_str(contents)
            .map_err(|e| ConvertError::Config(format!("Failed to parse configuration: {}", e)))
    }

    /// The built-in settings
    pub fn builtin() -> Self {
        // DEFAULT_CONFIG is checked by test_default_config_parses
        Self::from_yaml(DEFAULT_CONFIG).unwrap_or_default()
    }

    /// Build the immutable category lookup table
    pub fn category_mapping(&self) -> Result<CategoryMapping, ConvertError> {
        let mut pairs = Vec::new();

        for (key, value) in &self.category_mappings {
            let source = scalar_to_string(key).ok_or_else(|| {
                ConvertError::Config(format!(
                    "category_mappings key must be a plain value, got {:?}",
                    key
                ))
            })?;
            let target = scalar_to_string(value).ok_or_else(|| {
                ConvertError::Config(format!(
                    "category_mappings value for '{}' must be a plain value",
                    source
                ))
            })?;
            pairs.push((source, target));
        }

        CategoryMapping::from_pairs(pairs, self.advanced.case_sensitive_matching)
    }

    /// Write the default configuration, refusing to overwrite an existing file
    pub fn write_default(path: &Path) -> Result<(), ConvertError> {
        if path.exists() {
            return Err(ConvertError::Config(format!(
                "Refusing to overwrite existing configuration: {}",
                path.display()
            )));
        }

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, DEFAULT_CONFIG).map_err(|e| {
            ConvertError::Io(format!(
                "Failed to write configuration file {}: {}",
                path.display(),
                e
            ))
        })
    }
}

/// Render a YAML scalar as text (`529: x` has a numeric key)
fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
