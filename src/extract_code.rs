//! Extractor for legacy source modules.
//!
//! Scans the module line by line. A line whose trimmed form matches the
//! routine-declaration pattern yields a function record; independently, a
//! line containing a statement keyword yields a query record. One line can
//! contribute to both lists.
//!
//! The embedded-query heuristic takes the text from the keyword up to the
//! next `"` found after a minimum offset, or the whole line when no quote
//! follows. A quoted string spanning multiple lines is not reconstructed;
//! only the single line is inspected. This is a documented limitation of the
//! extraction, not something to silently fix.

use crate::models::{CodeExtraction, Extracted, FunctionRecord, QueryRecord, RoutineKind};
use crate::patterns::{ROUTINE_DECL, STATEMENT_KEYWORD};

/// Minimum distance past the keyword before a closing quote is considered.
/// Keeps short string openers like `= "SELECT"` from truncating the query
/// to nothing.
const QUERY_QUOTE_MIN_OFFSET: usize = 10;

/// Extract routine declarations and embedded SQL from one source module.
pub fn extract_code(content: &str) -> Extracted<CodeExtraction> {
    let mut functions = Vec::new();
    let mut queries = Vec::new();
    let mut notices = Vec::new();

    for (index, line) in content.lines().enumerate() {
        let trimmed = line.trim();

        if let Some(caps) = ROUTINE_DECL.captures(trimmed) {
            let kind = if caps[2].eq_ignore_ascii_case("Sub") {
                RoutineKind::Routine
            } else {
                RoutineKind::Function
            };
            functions.push(FunctionRecord {
                name: caps[3].to_string(),
                kind,
                line: index + 1,
            });
        }

        if let Some(caps) = STATEMENT_KEYWORD.captures(trimmed) {
            let keyword = caps.get(1).expect("group 1 always present").as_str();
            queries.push(QueryRecord {
                query: embedded_query(line, keyword),
                kind: keyword.to_uppercase(),
                line: index + 1,
            });
        }
    }

    if functions.is_empty() && queries.is_empty() {
        notices.push("no routine declarations or SQL statements detected".to_string());
    }

    let summary = format!(
        "Module contains {} functions/subs and {} SQL operations.",
        functions.len(),
        queries.len()
    );

    Extracted::with_notices(
        CodeExtraction {
            functions,
            queries,
            summary,
        },
        notices,
    )
}

/// Best-effort slice of the SQL text embedded in `line`, starting at the
/// statement keyword and ending at the next `"` past the minimum offset.
fn embedded_query(line: &str, keyword: &str) -> String {
    let start = line.find(keyword).unwrap_or(0);
    let search_from = start + keyword.len() + QUERY_QUOTE_MIN_OFFSET;
    let text = match line.get(search_from..).and_then(|rest| rest.find('"')) {
        Some(pos) => &line[start..search_from + pos],
        None => line,
    };
    text.trim().to_string()
}
