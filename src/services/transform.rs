//! Row transformation
//!
//! Maps one Personal Capital row onto Monarch's eight import columns.

use crate::models::{CategoryMapping, DestinationRecord, SourceRecord};

/// Transform a single Personal Capital row into a Monarch row
///
/// Date and Amount are copied verbatim (negative = expense). The description
/// fills both Merchant and Original Statement. Account is left empty so it
/// can be assigned during upload.
pub fn transform(record: &SourceRecord, mapping: &CategoryMapping) -> DestinationRecord {
    match record {
        SourceRecord::Investment(row) => DestinationRecord {
            date: row.date.clone(),
            merchant: row.description.clone(),
            category: mapping.lookup(&row.category).to_string(),
            account: String::new(),
            original_statement: row.description.clone(),
            notes: row.action.clone(),
            amount: row.amount.clone(),
            tags: String::new(),
        },
        SourceRecord::Standard(row) => DestinationRecord {
            date: row.date.clone(),
            merchant: row.description.clone(),
            category: mapping.lookup(&row.category).to_string(),
            account: String::new(),
            original_statement: row.description.clone(),
            notes: String::new(),
            amount: row.amount.clone(),
            tags: row.tags.clone().unwrap_or_default(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::models::{InvestmentRow, StandardRow};

    fn mapping() -> CategoryMapping {
        Settings::builtin().category_mapping().unwrap()
    }

    fn standard(category: &str, tags: Option<&str>, amount: &str) -> SourceRecord {
        SourceRecord::Standard(StandardRow {
            date: "2024-01-15".into(),
            description: "Shell Gas Station".into(),
            category: category.into(),
            tags: tags.map(Into::into),
            amount: amount.into(),
        })
    }

    #[test]
    fn test_transform_basic_transaction() {
        let result = transform(
            &standard("Gasoline/Fuel", Some("business,trip"), "-45.00"),
            &mapping(),
        );

        assert_eq!(result.date, "2024-01-15");
        assert_eq!(result.merchant, "Shell Gas Station");
        assert_eq!(result.category, "Gas");
        assert_eq!(result.account, "");
        assert_eq!(result.original_statement, "Shell Gas Station");
        assert_eq!(result.notes, "");
        assert_eq!(result.amount, "-45.00");
        assert_eq!(result.tags, "business,trip");
    }

    #[test]
    fn test_transform_unmapped_category() {
        let result = transform(&standard("Unmapped Category", None, "-1.00"), &mapping());
        assert_eq!(result.category, "Unmapped Category");
    }

    #[test]
    fn test_transform_investment_uses_action_for_notes() {
        let record = SourceRecord::Investment(InvestmentRow {
            date: "2024-03-01".into(),
            description: "VANGUARD TOTAL STOCK".into(),
            category: "Stocks".into(),
            action: "Buy".into(),
            quantity: "10".into(),
            price: "250.00".into(),
            amount: "-2500.00".into(),
        });
        let result = transform(&record, &mapping());

        assert_eq!(result.category, "Stocks");
        assert_eq!(result.notes, "Buy");
        assert_eq!(result.tags, "");
        assert_eq!(result.amount, "-2500.00");
    }

    #[test]
    fn test_transform_missing_fields() {
        let record = SourceRecord::Standard(StandardRow {
            date: "2024-01-15".into(),
            description: "Test Transaction".into(),
            amount: "-10.00".into(),
            ..Default::default()
        });
        let result = transform(&record, &mapping());

        assert_eq!(result.category, "");
        assert_eq!(result.tags, "");
        assert_eq!(result.notes, "");
        assert_eq!(result.amount, "-10.00");
    }

    #[test]
    fn test_transform_special_characters() {
        let record = SourceRecord::Standard(StandardRow {
            date: "2024-01-15".into(),
            description: "McDonald's, Inc. & \"Big Store\"".into(),
            category: "Entertainment".into(),
            tags: None,
            amount: "-12.34".into(),
        });
        let result = transform(&record, &mapping());

        assert_eq!(result.merchant, "McDonald's, Inc. & \"Big Store\"");
        assert_eq!(result.original_statement, result.merchant);
        assert_eq!(result.category, "Entertainment & Recreation");
    }

    #[test]
    fn test_amount_sign_preserved() {
        for amount in ["-50.00", "2500.00", "0.00", "-0.50"] {
            let result = transform(&standard("Paychecks/Salary", None, amount), &mapping());
            assert_eq!(result.amount, amount);
        }
    }

    #[test]
    fn test_output_always_has_eight_fields() {
        let rows = [
            standard("Travel", Some("a"), "1"),
            standard("", None, ""),
            SourceRecord::Investment(InvestmentRow::default()),
        ];
        for row in &rows {
            let converted = transform(row, &mapping());
            let fields = converted.fields();
            assert_eq!(fields.len(), DestinationRecord::HEADER.len());
            assert_eq!(fields[3], "");
        }
    }
}
