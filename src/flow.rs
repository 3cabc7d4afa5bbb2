//! Flow synthesizer: derives a sequence-diagram script from log text.
//!
//! The output is a line-oriented script consumed by an external renderer:
//! a `sequenceDiagram` header, three `participant` declarations, then one
//! step line per classified log line. Solid arrows (`->>`) are calls, dashed
//! arrows (`-->>`) are returns.
//!
//! Only the first [`MAX_LINES`] non-blank lines are inspected. Each line is
//! classified by a first-match-wins keyword test; lines matching no class
//! contribute no step. That silent skip is intentional signal-filtering:
//! most log lines carry no lifecycle information.

use crate::patterns::{FLOW_DATA, FLOW_DONE, FLOW_FAIL, FLOW_START};

/// Number of non-blank log lines inspected.
const MAX_LINES: usize = 10;
/// Label prefix length for ordinary steps.
const LABEL_CHARS: usize = 40;
/// Label prefix length for the error excerpt.
const ERROR_LABEL_CHARS: usize = 30;

/// Build a sequence-diagram script from raw log text.
pub fn synthesize_flow(content: &str) -> String {
    let mut script = String::from("sequenceDiagram\n");
    script.push_str("    participant User\n");
    script.push_str("    participant System\n");
    script.push_str("    participant Database\n\n");

    for line in content
        .lines()
        .filter(|l| !l.trim().is_empty())
        .take(MAX_LINES)
    {
        if FLOW_START.is_match(line) {
            script.push_str(&format!("    User->>System: {}\n", prefix(line, LABEL_CHARS)));
        } else if FLOW_DATA.is_match(line) {
            script.push_str(&format!(
                "    System->>Database: {}\n",
                prefix(line, LABEL_CHARS)
            ));
            script.push_str("    Database-->>System: Return data\n");
        } else if FLOW_FAIL.is_match(line) {
            script.push_str(&format!(
                "    System->>System: Error: {}\n",
                prefix(line, ERROR_LABEL_CHARS)
            ));
        } else if FLOW_DONE.is_match(line) {
            script.push_str(&format!(
                "    System-->>User: {}\n",
                prefix(line, LABEL_CHARS)
            ));
        }
    }

    script
}

/// Character-boundary-safe prefix of `line`, keeping labels readable.
fn prefix(line: &str, max_chars: usize) -> String {
    line.chars().take(max_chars).collect()
}
