//! Category mapping model
//!
//! The lookup table translating Personal Capital category labels into
//! Monarch Money category labels.

use std::collections::HashMap;

use crate::error::ConvertError;

/// Immutable category lookup table
///
/// Built once from configuration. When case-insensitive, keys are stored
/// lowercased and queries are lowercased before lookup.
#[derive(Debug, Clone, Default)]
pub struct CategoryMapping {
    entries: HashMap<String, String>,
    case_sensitive: bool,
}

impl CategoryMapping {
    /// Build a mapping from `(source, target)` pairs
    ///
    /// Two keys that normalize to the same string are rejected rather than
    /// letting one silently win.
    pub fn from_pairs<I>(pairs: I, case_sensitive: bool) -> Result<Self, ConvertError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut entries = HashMap::new();
        let mut originals: HashMap<String, String> = HashMap::new();

        for (source, target) in pairs {
            let key = normalize(&source, case_sensitive);
            if let Some(previous) = originals.get(&key) {
                return Err(ConvertError::Config(format!(
                    "Duplicate category mapping: '{}' conflicts with '{}'",
                    source, previous
                )));
            }
            originals.insert(key.clone(), source);
            entries.insert(key, target);
        }

        Ok(Self {
            entries,
            case_sensitive,
        })
    }

    /// Look up a category, returning the input unchanged when unmapped
    pub fn lookup<'a>(&'a self, category: &'a str) -> &'a str {
        self.get(category).unwrap_or(category)
    }

    /// Look up a category, returning `None` when unmapped
    pub fn get(&self, category: &str) -> Option<&str> {
        if category.is_empty() {
            return None;
        }
        if self.case_sensitive {
            self.entries.get(category).map(String::as_str)
        } else {
            self.entries
                .get(&category.to_lowercase())
                .map(String::as_str)
        }
    }

    /// Whether lookups are case-sensitive
    pub fn is_case_sensitive(&self) -> bool {
        self.case_sensitive
    }

    /// Number of mapping rules
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table has no rules
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn normalize(key: &str, case_sensitive: bool) -> String {
    if case_sensitive {
        key.to_string()
    } else {
        key.to_lowercase()
    }
}
