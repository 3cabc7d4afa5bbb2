//! Extractor for standalone SQL scripts.
//!
//! Statements are accumulated across lines: a line starting with a statement
//! keyword opens a new buffer (flushing any statement already in progress),
//! subsequent non-empty lines are appended, and a line ending in `;` emits
//! the buffer as a completed statement tagged with its leading verb and the
//! line where it began.
//!
//! A statement with no terminating `;` before end of file is dropped, and a
//! `;` inside a string literal ends the statement early: the splitter has
//! no notion of escaping. Both behaviors are preserved from the legacy
//! tooling this replaces.

use crate::models::{Extracted, QueryRecord, SqlExtraction};
use crate::patterns::STATEMENT_START;

/// Split a SQL script into semicolon-terminated statements.
pub fn extract_sql(content: &str) -> Extracted<SqlExtraction> {
    let mut queries = Vec::new();
    let mut notices = Vec::new();

    let mut buffer = String::new();
    let mut start_line = 0usize;

    for (index, line) in content.lines().enumerate() {
        let trimmed = line.trim();

        if STATEMENT_START.is_match(trimmed) {
            if !buffer.is_empty() {
                queries.push(make_record(&buffer, start_line));
            }
            buffer = line.to_string();
            start_line = index + 1;
        } else if !buffer.is_empty() && !trimmed.is_empty() {
            buffer.push('\n');
            buffer.push_str(line);
        }

        if trimmed.ends_with(';') && !buffer.is_empty() {
            queries.push(make_record(&buffer, start_line));
            buffer.clear();
        }
    }

    if !buffer.is_empty() {
        notices.push(format!(
            "unterminated statement starting at line {} was dropped (no closing ';')",
            start_line
        ));
    }

    let summary = format!("SQL file contains {} queries.", queries.len());
    Extracted::with_notices(SqlExtraction { queries, summary }, notices)
}

fn make_record(buffer: &str, start_line: usize) -> QueryRecord {
    let kind = buffer
        .trim()
        .split_whitespace()
        .next()
        .map(|w| w.to_uppercase())
        .unwrap_or_else(|| "UNKNOWN".to_string());
    QueryRecord {
        query: buffer.trim().to_string(),
        kind,
        line: start_line,
    }
}
