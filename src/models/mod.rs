//! Core data models for pc2monarch
//!
//! This module contains the data structures of the conversion: the category
//! lookup table, source and destination rows, and run statistics.

pub mod category_mapping;
pub mod record;
pub mod stats;

pub use category_mapping::CategoryMapping;
pub use record::{
    ColumnIndex, DestinationRecord, InvestmentRow, SourceFormat, SourceRecord, StandardRow,
};
pub use stats::{
    track_remapping, ConversionStats, FileOutcome, FileReport, RemapCounts, RemapTally,
};
