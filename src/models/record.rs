//! Transaction record models
//!
//! Source rows come in two Personal Capital layouts and are represented as a
//! tagged union; destination rows always have Monarch's eight columns.

use std::fmt;

use csv::StringRecord;
use serde::Serialize;

/// Personal Capital export layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceFormat {
    /// Brokerage accounts: Action, Quantity and Price columns
    Investment,
    /// Checking, savings and credit card accounts, optional Tags column
    Standard,
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceFormat::Investment => write!(f, "investment"),
            SourceFormat::Standard => write!(f, "standard"),
        }
    }
}

/// Positions of the recognized columns within a header
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnIndex {
    pub date: usize,
    pub description: usize,
    pub category: usize,
    pub amount: usize,
    pub tags: Option<usize>,
    pub action: Option<usize>,
    pub quantity: Option<usize>,
    pub price: Option<usize>,
    /// Number of columns in the header
    pub width: usize,
}

/// Investment account row
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InvestmentRow {
    pub date: String,
    pub description: String,
    pub category: String,
    pub action: String,
    pub quantity: String,
    pub price: String,
    pub amount: String,
}

/// Standard account row
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StandardRow {
    pub date: String,
    pub description: String,
    pub category: String,
    /// `None` when the export has no Tags column
    pub tags: Option<String>,
    pub amount: String,
}

/// One row of a Personal Capital export
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceRecord {
    Investment(InvestmentRow),
    Standard(StandardRow),
}

impl SourceRecord {
    /// Read a CSV row using the detected layout
    ///
    /// Cells past the end of a short row read as empty strings.
    pub fn from_row(format: SourceFormat, columns: &ColumnIndex, row: &StringRecord) -> Self {
        let cell = |idx: usize| row.get(idx).unwrap_or_default().to_string();
        let optional = |idx: Option<usize>| idx.map(cell).unwrap_or_default();

        match format {
            SourceFormat::Investment => SourceRecord::Investment(InvestmentRow {
                date: cell(columns.date),
                description: cell(columns.description),
                category: cell(columns.category),
                action: optional(columns.action),
                quantity: optional(columns.quantity),
                price: optional(columns.price),
                amount: cell(columns.amount),
            }),
            SourceFormat::Standard => SourceRecord::Standard(StandardRow {
                date: cell(columns.date),
                description: cell(columns.description),
                category: cell(columns.category),
                tags: columns.tags.map(cell),
                amount: cell(columns.amount),
            }),
        }
    }

    /// Personal Capital category label
    pub fn category(&self) -> &str {
        match self {
            SourceRecord::Investment(row) => &row.category,
            SourceRecord::Standard(row) => &row.category,
        }
    }
}

/// One row of a Monarch Money import file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DestinationRecord {
    pub date: String,
    pub merchant: String,
    pub category: String,
    /// Always empty: the account is chosen in Monarch during upload
    pub account: String,
    pub original_statement: String,
    pub notes: String,
    pub amount: String,
    pub tags: String,
}

impl DestinationRecord {
    /// Monarch's column order
    pub const HEADER: [&'static str; 8] = [
        "Date",
        "Merchant",
        "Category",
        "Account",
        "Original Statement",
        "Notes",
        "Amount",
        "Tags",
    ];

    /// Field values in header order
    pub fn fields(&self) -> [&str; 8] {
        [
            self.date.as_str(),
            self.merchant.as_str(),
            self.category.as_str(),
            self.account.as_str(),
            self.original_statement.as_str(),
            self.notes.as_str(),
            self.amount.as_str(),
            self.tags.as_str(),
        ]
    }
}
