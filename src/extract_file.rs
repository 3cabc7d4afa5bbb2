//! Metadata-only extractor for binary-ish uploads.
//!
//! PDF text, images, media, spreadsheets, archives, and anything else that
//! is not one of the structured kinds all produce the same shape of record:
//! a title derived from the filename, the file's size and MIME type, fixed
//! per-kind category/tag defaults, and a bounded content preview when any
//! decoded text is available. Absence of structure degrades to defaults
//! rather than erroring.

use crate::extract_doc::preview;
use crate::models::{Extracted, FileCard};

/// Size and MIME type taken from the source file object.
#[derive(Debug, Clone)]
pub struct FileMeta {
    pub size_bytes: u64,
    pub mime: String,
}

const DEFAULT_MIME: &str = "application/octet-stream";

/// Build a metadata card for a binary-ish upload.
///
/// `content` is the decoded text when the caller has any (PDF text,
/// spreadsheet exports); `None` for opaque binaries.
pub fn extract_file_card(
    content: Option<&str>,
    filename: &str,
    meta: &FileMeta,
    category: &str,
    tags: &[&str],
) -> Extracted<FileCard> {
    let mut notices = Vec::new();

    let mime = if meta.mime.trim().is_empty() {
        notices.push("no MIME type supplied, defaulted".to_string());
        DEFAULT_MIME.to_string()
    } else {
        meta.mime.clone()
    };

    let title = filename
        .rsplit_once('.')
        .map(|(stem, _)| stem)
        .filter(|stem| !stem.is_empty())
        .unwrap_or(filename)
        .to_string();

    Extracted::with_notices(
        FileCard {
            title,
            category: category.to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            size_bytes: meta.size_bytes,
            mime,
            preview: content.map(preview).unwrap_or_default(),
        },
        notices,
    )
}
