//! Extractor for standard operating procedure documents.
//!
//! Steps are detected by the `Step N.` / `N:` heading pattern; each heading
//! opens a new step whose title is the first line of trailing text and whose
//! description is the full trailing text up to the next heading. A document
//! with no detectable steps still yields a record: the entire content is
//! wrapped in a single fallback step, so a SOP record is never empty.

use crate::models::{Extracted, SopDoc, SopStep};
use crate::patterns::SOP_STEP;

const DEFAULT_CATEGORY: &str = "general";

/// Parse a procedure document into titled steps.
pub fn extract_sop(content: &str, filename: &str) -> Extracted<SopDoc> {
    let mut notices = Vec::new();

    let title = match content.lines().find(|l| !l.trim().is_empty()) {
        Some(line) => strip_markup(line),
        None => {
            notices.push("document is empty, title derived from filename".to_string());
            filename.to_string()
        }
    };

    let category = content
        .lines()
        .find_map(|l| value_for_key(l, "category"))
        .unwrap_or_else(|| DEFAULT_CATEGORY.to_string());

    let mut steps: Vec<SopStep> = Vec::new();
    // (number, accumulated trailing text) for the step currently open.
    let mut open: Option<(usize, Vec<String>)> = None;

    for line in content.lines() {
        let trimmed = line.trim();
        if let Some(caps) = SOP_STEP.captures(trimmed) {
            if let Some((number, text)) = open.take() {
                steps.push(finish_step(number, &text));
            }
            let number = caps[1].parse().unwrap_or(steps.len() + 1);
            let rest = caps[2].trim().to_string();
            let text = if rest.is_empty() { Vec::new() } else { vec![rest] };
            open = Some((number, text));
        } else if let Some((_, text)) = open.as_mut() {
            if !trimmed.is_empty() {
                text.push(trimmed.to_string());
            }
        }
    }
    if let Some((number, text)) = open.take() {
        steps.push(finish_step(number, &text));
    }

    if steps.is_empty() {
        notices.push("no step headings detected, wrapped content in one step".to_string());
        steps.push(SopStep {
            number: 1,
            title: title.clone(),
            description: content.to_string(),
            duration: None,
        });
    }

    let step_count = steps.len();
    Extracted::with_notices(
        SopDoc {
            title,
            category,
            steps,
            step_count,
            content: content.to_string(),
        },
        notices,
    )
}

fn finish_step(number: usize, text: &[String]) -> SopStep {
    let title = text.first().cloned().unwrap_or_default();
    let duration = text.iter().find_map(|l| value_for_key(l, "duration"));
    SopStep {
        number,
        title,
        description: text.join("\n"),
        duration,
    }
}

/// Strip leading markdown-ish markup (`#`, `*`, `-`, `>`) from a heading line.
fn strip_markup(line: &str) -> String {
    line.trim()
        .trim_start_matches(['#', '*', '-', '>', '='])
        .trim()
        .to_string()
}

/// Match a `key: value` line, case-insensitively.
fn value_for_key(line: &str, key: &str) -> Option<String> {
    let (k, v) = line.split_once(':')?;
    if k.trim().eq_ignore_ascii_case(key) {
        let v = v.trim();
        if !v.is_empty() {
            return Some(v.to_string());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOP: &str = "\
# Daily Price Sync
category: pricing

Step 1. Export price file
Run the export job from the head office menu.
duration: 10 min

Step 2: Verify counts
Compare row counts against yesterday's file.

3. Upload to stores
";

    #[test]
    fn title_strips_markup() {
        let out = extract_sop(SOP, "sync.md").record;
        assert_eq!(out.title, "Daily Price Sync");
        assert_eq!(out.category, "pricing");
    }

    #[test]
    fn detects_step_variants() {
        let out = extract_sop(SOP, "sync.md").record;
        assert_eq!(out.step_count, 3);
        assert_eq!(out.steps[0].number, 1);
        assert_eq!(out.steps[0].title, "Export price file");
        assert!(out.steps[0].description.contains("export job"));
        assert_eq!(out.steps[0].duration.as_deref(), Some("10 min"));
        assert_eq!(out.steps[1].number, 2);
        assert_eq!(out.steps[1].title, "Verify counts");
        assert_eq!(out.steps[2].number, 3);
        assert_eq!(out.steps[2].title, "Upload to stores");
    }

    #[test]
    fn no_steps_yields_single_fallback_step() {
        let content = "Checklist\nDo the thing.\nThen the other thing.\n";
        let out = extract_sop(content, "notes.txt");
        assert_eq!(out.record.step_count, 1);
        assert_eq!(out.record.steps[0].description, content);
        assert_eq!(out.notices.len(), 1);
    }

    #[test]
    fn empty_document_falls_back_to_filename_title() {
        let out = extract_sop("", "procedure.txt");
        assert_eq!(out.record.title, "procedure.txt");
        assert_eq!(out.record.step_count, 1);
        assert_eq!(out.notices.len(), 2);
    }
}
