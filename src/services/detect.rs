//! Export format detection
//!
//! Classifies a Personal Capital header row as one of the two known layouts.
//! Column names must match exactly.

use csv::StringRecord;

use crate::error::{ConvertError, ConvertResult};
use crate::models::{ColumnIndex, SourceFormat};

/// Columns every export must carry
pub const REQUIRED_COLUMNS: [&str; 4] = ["Date", "Description", "Category", "Amount"];

/// Columns that mark an investment account export
pub const INVESTMENT_COLUMNS: [&str; 3] = ["Action", "Quantity", "Price"];

/// Optional column of standard exports
pub const TAGS_COLUMN: &str = "Tags";

const BYTE_ORDER_MARK: char = '\u{feff}';

/// Result of a successful detection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectedFormat {
    pub format: SourceFormat,
    pub columns: ColumnIndex,
}

/// Detect the export layout from header names
pub fn detect_format<S: AsRef<str>>(headers: &[S]) -> ConvertResult<DetectedFormat> {
    let position = |name: &str| {
        headers.iter().enumerate().position(|(idx, header)| {
            let header = header.as_ref();
            // Only the first cell can carry a byte-order mark
            let header = if idx == 0 {
                header.trim_start_matches(BYTE_ORDER_MARK)
            } else {
                header
            };
            header == name
        })
    };

    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|name| position(*name).is_none())
        .collect();
    if !missing.is_empty() {
        return Err(ConvertError::missing_columns(missing));
    }

    let [date, description, category, amount] = REQUIRED_COLUMNS.map(|name| position(name));
    let mut columns = ColumnIndex {
        date: date.unwrap_or_default(),
        description: description.unwrap_or_default(),
        category: category.unwrap_or_default(),
        amount: amount.unwrap_or_default(),
        width: headers.len(),
        ..Default::default()
    };

    let [action, quantity, price] = INVESTMENT_COLUMNS.map(|name| position(name));
    let format = if action.is_some() && quantity.is_some() && price.is_some() {
        columns.action = action;
        columns.quantity = quantity;
        columns.price = price;
        SourceFormat::Investment
    } else {
        columns.tags = position(TAGS_COLUMN);
        SourceFormat::Standard
    };

    Ok(DetectedFormat { format, columns })
}

/// Detect the export layout from a parsed CSV header record
pub fn detect_from_record(headers: &StringRecord) -> ConvertResult<DetectedFormat> {
    let names: Vec<&str> = headers.iter().collect();
    detect_format(&names)
}
