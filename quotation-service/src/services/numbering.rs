//! Document number generation.
//!
//! Numbers follow the format `PREFIX` + `YYMM` + `-` + zero-padded sequence,
//! e.g. `INV2608-001`. The sequence is keyed by document type and calendar
//! month and restarts at 001 each month.

use chrono::{Datelike, NaiveDate};

use crate::models::DocumentType;

/// Two-digit year + two-digit month segment, e.g. "2608" for August 2026.
pub fn year_month_segment(date: NaiveDate) -> String {
    format!("{:02}{:02}", date.year() % 100, date.month())
}

/// SQL LIKE pattern matching every number of the given type and month.
pub fn number_pattern(document_type: DocumentType, date: NaiveDate) -> String {
    format!(
        "{}{}-%",
        document_type.number_prefix(),
        year_month_segment(date)
    )
}

/// Next sequence value given the latest existing number for the month,
/// starting at 1 when there is none. A malformed latest number also restarts
/// the sequence at 1.
pub fn next_sequence(latest: Option<&str>) -> u32 {
    latest
        .and_then(|number| number.split('-').nth(1))
        .and_then(|seq| seq.parse::<u32>().ok())
        .map(|seq| seq + 1)
        .unwrap_or(1)
}

/// Format a full document number from its parts.
pub fn format_document_number(document_type: DocumentType, date: NaiveDate, sequence: u32) -> String {
    format!(
        "{}{}-{:03}",
        document_type.number_prefix(),
        year_month_segment(date),
        sequence
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn year_month_segment_is_zero_padded() {
        assert_eq!(year_month_segment(date(2026, 8, 7)), "2608");
        assert_eq!(year_month_segment(date(2030, 12, 1)), "3012");
        assert_eq!(year_month_segment(date(2027, 1, 31)), "2701");
    }

    #[test]
    fn first_number_of_the_month() {
        assert_eq!(next_sequence(None), 1);
        assert_eq!(
            format_document_number(DocumentType::Invoice, date(2026, 8, 7), 1),
            "INV2608-001"
        );
    }

    #[test]
    fn sequence_increments_from_latest() {
        assert_eq!(next_sequence(Some("INV2608-007")), 8);
        assert_eq!(
            format_document_number(DocumentType::Invoice, date(2026, 8, 7), 8),
            "INV2608-008"
        );
    }

    #[test]
    fn sequence_grows_past_three_digits() {
        assert_eq!(next_sequence(Some("REC2608-999")), 1000);
        assert_eq!(
            format_document_number(DocumentType::Receipt, date(2026, 8, 7), 1000),
            "REC2608-1000"
        );
    }

    #[test]
    fn malformed_latest_restarts_sequence() {
        assert_eq!(next_sequence(Some("garbage")), 1);
        assert_eq!(next_sequence(Some("INV2608-abc")), 1);
    }

    #[test]
    fn prefixes_per_document_type() {
        let d = date(2026, 8, 7);
        assert_eq!(number_pattern(DocumentType::Invoice, d), "INV2608-%");
        assert_eq!(number_pattern(DocumentType::Receipt, d), "REC2608-%");
        assert_eq!(number_pattern(DocumentType::TaxInvoice, d), "TAX2608-%");
    }
}
