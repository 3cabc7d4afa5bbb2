//! Extractors for free-form documents and diagram markup.
//!
//! Both are pure `(content, filename) -> record` functions. Documents pull
//! their attributes from `key: value` style lines when present and fall back
//! to fixed defaults otherwise; diagrams derive an element count from
//! format-specific token counts. Neither ever fails.

use crate::models::{DiagramCard, DocumentCard, Extracted};
use crate::patterns::DIAGRAM_KEYWORDS;

const DEFAULT_CATEGORY: &str = "general";
/// Upper bound on the stored content preview.
const PREVIEW_MAX_CHARS: usize = 500;

/// Extract metadata from a free-form text document.
pub fn extract_document(content: &str, filename: &str) -> Extracted<DocumentCard> {
    let mut notices = Vec::new();

    let title = match content.lines().find(|l| !l.trim().is_empty()) {
        Some(line) => strip_markup(line),
        None => {
            notices.push("document is empty, title derived from filename".to_string());
            filename.to_string()
        }
    };

    let category = keyed_value(content, &["category"]).unwrap_or_else(|| DEFAULT_CATEGORY.to_string());
    let tags = keyed_value(content, &["tags"])
        .map(|v| {
            v.split(',')
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .collect()
        })
        .unwrap_or_default();
    let description = keyed_value(content, &["description", "summary"]).unwrap_or_default();

    Extracted::with_notices(
        DocumentCard {
            title,
            category,
            tags,
            description,
            content: preview(content),
        },
        notices,
    )
}

/// Extract metadata from diagram markup, classified by filename extension.
pub fn extract_diagram(content: &str, filename: &str) -> Extracted<DiagramCard> {
    let ext = filename
        .rsplit_once('.')
        .map(|(_, e)| e.to_ascii_lowercase())
        .unwrap_or_default();

    let (format, element_count) = match ext.as_str() {
        "mmd" | "mermaid" => ("mermaid".to_string(), count_keywords(content)),
        "xml" | "drawio" | "svg" => ("xml".to_string(), count_xml_tags(content)),
        other => {
            let format = if other.is_empty() { "unknown".to_string() } else { other.to_string() };
            (format, content.lines().filter(|l| !l.trim().is_empty()).count())
        }
    };

    let title = filename
        .rsplit_once('.')
        .map(|(stem, _)| stem)
        .unwrap_or(filename)
        .to_string();
    let description = format!("{} diagram with {} elements", format, element_count);

    Extracted::clean(DiagramCard {
        title,
        format,
        element_count,
        description,
    })
}

/// Occurrences of diagram-language keywords across the whole source.
fn count_keywords(content: &str) -> usize {
    DIAGRAM_KEYWORDS
        .iter()
        .map(|kw| content.matches(kw).count())
        .sum()
}

/// Opening XML tags: `<` immediately followed by a name character.
fn count_xml_tags(content: &str) -> usize {
    content
        .char_indices()
        .filter(|&(i, c)| {
            c == '<'
                && content[i + 1..]
                    .chars()
                    .next()
                    .is_some_and(|n| n.is_ascii_alphabetic())
        })
        .count()
}

fn strip_markup(line: &str) -> String {
    line.trim()
        .trim_start_matches(['#', '*', '-', '>', '='])
        .trim()
        .to_string()
}

/// First matching `key: value` line for any of `keys`, case-insensitive.
fn keyed_value(content: &str, keys: &[&str]) -> Option<String> {
    content.lines().find_map(|line| {
        let (k, v) = line.split_once(':')?;
        let k = k.trim();
        if keys.iter().any(|key| k.eq_ignore_ascii_case(key)) {
            let v = v.trim();
            if !v.is_empty() {
                return Some(v.to_string());
            }
        }
        None
    })
}

/// Bounded, character-safe content preview.
pub fn preview(content: &str) -> String {
    content.chars().take(PREVIEW_MAX_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_reads_keyed_attributes() {
        let doc = "\
# Store Opening Notes
category: operations
tags: opening, checklist , stores
summary: What to do before opening.

Body text here.
";
        let out = extract_document(doc, "notes.md").record;
        assert_eq!(out.title, "Store Opening Notes");
        assert_eq!(out.category, "operations");
        assert_eq!(out.tags, vec!["opening", "checklist", "stores"]);
        assert_eq!(out.description, "What to do before opening.");
    }

    #[test]
    fn document_defaults_when_keys_absent() {
        let out = extract_document("Just some text.\nMore text.", "plain.txt").record;
        assert_eq!(out.title, "Just some text.");
        assert_eq!(out.category, "general");
        assert!(out.tags.is_empty());
        assert_eq!(out.description, "");
    }

    #[test]
    fn empty_document_uses_filename_title_with_notice() {
        let out = extract_document("", "empty.txt");
        assert_eq!(out.record.title, "empty.txt");
        assert_eq!(out.notices.len(), 1);
    }

    #[test]
    fn document_preview_is_bounded() {
        let long = "x".repeat(2000);
        let out = extract_document(&long, "big.txt").record;
        assert_eq!(out.content.chars().count(), 500);
    }

    #[test]
    fn mermaid_diagram_counts_keywords() {
        let src = "sequenceDiagram\n    participant A\n    participant B\n    A->>B: hi\n";
        let out = extract_diagram(src, "login.mmd").record;
        assert_eq!(out.format, "mermaid");
        assert_eq!(out.title, "login");
        // sequenceDiagram + 2x participant + 1x ->>
        assert_eq!(out.element_count, 4);
    }

    #[test]
    fn xml_diagram_counts_tags() {
        let src = "<mxfile><diagram name=\"p\"><root/></diagram></mxfile>";
        let out = extract_diagram(src, "arch.drawio").record;
        assert_eq!(out.format, "xml");
        assert_eq!(out.element_count, 3);
    }

    #[test]
    fn unknown_extension_counts_lines() {
        let out = extract_diagram("a\nb\n\nc\n", "sketch.puml").record;
        assert_eq!(out.format, "puml");
        assert_eq!(out.element_count, 3);
    }
}
