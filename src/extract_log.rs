//! Extractor for application log files.
//!
//! Each line is tested against the ordered error patterns in
//! [`crate::patterns`]; the first pattern that matches wins, so a line is
//! classified into at most one category and the specific domain categories
//! take precedence over the `general_error` catch-all.

use crate::models::{ErrorRecord, Extracted, LogExtraction};
use crate::patterns::classify_error_line;

/// Classify every line of a log file against the error pattern library.
pub fn extract_log(content: &str) -> Extracted<LogExtraction> {
    let errors: Vec<ErrorRecord> = content
        .lines()
        .enumerate()
        .filter_map(|(index, line)| {
            classify_error_line(line).map(|p| ErrorRecord {
                pattern: line.trim().to_string(),
                line: index + 1,
                category: p.category.to_string(),
                root_cause: p.root_cause.to_string(),
            })
        })
        .collect();

    let summary = format!("Log contains {} error patterns detected.", errors.len());
    Extracted::clean(LogExtraction { errors, summary })
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOG: &str = "\
2024-03-01 09:00:01 batch started
2024-03-01 09:00:02 price mismatch for PLU 7781
2024-03-01 09:00:03 PLU 9930 not found in master
2024-03-01 09:00:04 job failed: timeout
2024-03-01 09:00:05 batch complete
";

    #[test]
    fn each_line_yields_at_most_one_record() {
        let out = extract_log(LOG).record;
        assert_eq!(out.errors.len(), 3);
        assert_eq!(out.errors[0].category, "price_mismatch");
        assert_eq!(out.errors[0].line, 2);
        assert_eq!(out.errors[1].category, "plu_not_found");
        assert_eq!(out.errors[2].category, "general_error");
        assert_eq!(out.errors[2].line, 4);
    }

    #[test]
    fn specific_category_wins_over_general() {
        // "error" also matches the catch-all; the warehouse pattern is
        // checked first.
        let out = extract_log("warehouse error: stock drift at site 03").record;
        assert_eq!(out.errors.len(), 1);
        assert_eq!(out.errors[0].category, "gudang_mismatch");
    }

    #[test]
    fn clean_log_yields_zero_errors() {
        let out = extract_log("all good\nnothing to report\n").record;
        assert!(out.errors.is_empty());
        assert_eq!(out.summary, "Log contains 0 error patterns detected.");
    }

    #[test]
    fn indonesian_price_wording_is_classified() {
        let out = extract_log("2024-01-01 harga tidak sesuai untuk PLU 42\n").record;
        assert_eq!(out.errors.len(), 1);
        assert_eq!(out.errors[0].category, "price_mismatch");
        assert_eq!(
            out.errors[0].root_cause,
            "Price synchronization issue between systems"
        );
    }

    #[test]
    fn matched_line_text_is_trimmed() {
        let out = extract_log("   PPN salah pada faktur 12   ").record;
        assert_eq!(out.errors[0].pattern, "PPN salah pada faktur 12");
        assert_eq!(out.errors[0].category, "ppn_error");
    }
}
