//! Fixed pattern library shared by the extractors.
//!
//! The error patterns form an ordered precedence list evaluated
//! top-to-bottom; the first pattern matching a line wins, so the specific
//! domain categories must stay ahead of the `general_error` catch-all. The
//! legacy systems these logs come from mix English and Indonesian wording,
//! so most patterns accept both.

use once_cell::sync::Lazy;
use regex::Regex;

/// One log classification rule: matcher, category tag, and the canned
/// root-cause text stored on every hit.
pub struct ErrorPattern {
    pub regex: Regex,
    pub category: &'static str,
    pub root_cause: &'static str,
}

/// Ordered error classification rules. Order is precedence.
pub static ERROR_PATTERNS: Lazy<Vec<ErrorPattern>> = Lazy::new(|| {
    let triple = |pattern: &str, category, root_cause| ErrorPattern {
        regex: Regex::new(pattern).expect("fixed pattern must compile"),
        category,
        root_cause,
    };
    vec![
        triple(
            r"(?i)price.*mismatch|harga.*tidak.*sesuai",
            "price_mismatch",
            "Price synchronization issue between systems",
        ),
        triple(
            r"(?i)bkp.*missing|bkp.*tidak.*ditemukan",
            "bkp_missing",
            "BKP record not found in database",
        ),
        triple(
            r"(?i)plu.*not.*found|plu.*tidak.*ditemukan",
            "plu_not_found",
            "PLU code missing or not synchronized",
        ),
        triple(
            r"(?i)ppn.*error|ppn.*salah",
            "ppn_error",
            "Tax calculation error or missing configuration",
        ),
        triple(
            r"(?i)gudang.*mismatch|warehouse.*error",
            "gudang_mismatch",
            "Warehouse data inconsistency",
        ),
        triple(
            r"(?i)error|exception|failed",
            "general_error",
            "General system error",
        ),
    ]
});

/// Classify one log line. First matching pattern wins.
pub fn classify_error_line(line: &str) -> Option<&'static ErrorPattern> {
    ERROR_PATTERNS.iter().find(|p| p.regex.is_match(line))
}

/// Routine declaration: optional visibility, `Sub` or `Function`, identifier.
pub static ROUTINE_DECL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(Public|Private|Protected)?\s*(Sub|Function)\s+(\w+)").unwrap()
});

/// Statement keyword anywhere in a line (embedded SQL in source code).
pub static STATEMENT_KEYWORD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(SELECT|INSERT|UPDATE|DELETE|EXEC|CREATE|ALTER|DROP)\s+").unwrap()
});

/// Statement keyword at the start of a line (standalone SQL scripts).
pub static STATEMENT_START: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(SELECT|INSERT|UPDATE|DELETE|EXEC|CREATE|ALTER|DROP)\b").unwrap()
});

/// SOP step heading: optional `Step` prefix, number, `.` or `:`, rest.
pub static SOP_STEP: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(?:Step\s+)?(\d+)[.:]\s*(.*)").unwrap());

/// Flow lifecycle classes, first-match-wins in this order.
pub static FLOW_START: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)(start|begin|init)").unwrap());
pub static FLOW_DATA: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)(select|query|fetch)").unwrap());
pub static FLOW_FAIL: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)(error|exception|fail)").unwrap());
pub static FLOW_DONE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(response|return|complete)").unwrap());

/// Tokens counted when sizing a mermaid-style diagram.
pub const DIAGRAM_KEYWORDS: [&str; 6] = [
    "graph",
    "subgraph",
    "participant",
    "sequenceDiagram",
    "-->",
    "->>",
];
