//! Configuration module for pc2monarch
//!
//! This module provides configuration management including:
//! - Input, output and config path resolution
//! - Loading the category mapping document

pub mod paths;
pub mod settings;

pub use paths::ConverterPaths;
pub use settings::{AdvancedSettings, Settings};
