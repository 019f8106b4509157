//! pc2monarch - Personal Capital to Monarch Money transaction converter
//!
//! This library converts Personal Capital CSV transaction exports into the
//! eight-column CSV format accepted by Monarch Money's transaction upload,
//! remapping category labels through a configurable table.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Path defaults and the YAML category mapping document
//! - `error`: Custom error types
//! - `models`: Category mapping, source/destination rows, run statistics
//! - `services`: Format detection, row transformation, file conversion
//! - `display`: Terminal summary formatting
//! - `export`: JSON run report
//! - `logging`: tracing subscriber setup
//!
//! # Example
//!
//! ```rust,ignore
//! use pc2monarch::config::{ConverterPaths, Settings};
//! use pc2monarch::services::ConvertService;
//!
//! let paths = ConverterPaths::default();
//! let mapping = Settings::load(paths.config_file())?.category_mapping()?;
//! let stats = ConvertService::new(&mapping).run(&paths)?;
//! ```

pub mod config;
pub mod display;
pub mod error;
pub mod export;
pub mod logging;
pub mod models;
pub mod services;

pub use error::{ConvertError, ConvertResult};
