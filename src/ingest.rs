//! Ingestion orchestration.
//!
//! Routes one uploaded file, with its declared kind, to the matching
//! extractor and persists the results through the store. The kind is a
//! closed union so adding a new input kind forces this dispatch to be
//! extended. Extraction never aborts an upload: degradations are collected
//! as notices and reported alongside the outcome. Store failures abort the
//! operation and surface verbatim.

use anyhow::Result;
use serde_json::to_value;
use std::str::FromStr;

use crate::extract_code::extract_code;
use crate::extract_doc::{extract_diagram, extract_document};
use crate::extract_file::{extract_file_card, FileMeta};
use crate::extract_log::extract_log;
use crate::extract_sop::extract_sop;
use crate::extract_sql::extract_sql;
use crate::flow::synthesize_flow;
use crate::models::{CodeDoc, ErrorLog, Flow, QueryEntry};
use crate::store::{Collection, Store};

/// Declared kind of an uploaded file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadKind {
    Code,
    Sql,
    Log,
    Sop,
    Document,
    Diagram,
    PdfText,
    Image,
    Media,
    Spreadsheet,
    Archive,
    Other,
}

impl FromStr for UploadKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "code" => Ok(UploadKind::Code),
            "sql" => Ok(UploadKind::Sql),
            "log" => Ok(UploadKind::Log),
            "sop" => Ok(UploadKind::Sop),
            "document" | "doc" => Ok(UploadKind::Document),
            "diagram" => Ok(UploadKind::Diagram),
            "pdf" => Ok(UploadKind::PdfText),
            "image" => Ok(UploadKind::Image),
            "media" => Ok(UploadKind::Media),
            "spreadsheet" => Ok(UploadKind::Spreadsheet),
            "archive" => Ok(UploadKind::Archive),
            "other" => Ok(UploadKind::Other),
            other => Err(format!(
                "unknown upload kind '{}'. Available: code, sql, log, sop, document, \
                 diagram, pdf, image, media, spreadsheet, archive, other",
                other
            )),
        }
    }
}

/// One file handed to the orchestrator.
pub struct Upload<'a> {
    pub kind: UploadKind,
    pub filename: &'a str,
    /// Decoded text, when the file has any.
    pub content: Option<&'a str>,
    pub meta: FileMeta,
}

/// What an ingestion run produced.
#[derive(Debug, Default)]
pub struct IngestOutcome {
    /// `(collection, id)` of every record written.
    pub inserted: Vec<(Collection, String)>,
    /// Degradation notices from the extractors involved.
    pub notices: Vec<String>,
    /// One-line human summary of what was extracted.
    pub summary: String,
}

/// Route an upload to its extractor and persist the derived records.
pub fn ingest(store: &mut Store, upload: &Upload) -> Result<IngestOutcome> {
    let text = upload.content.unwrap_or_default();
    let mut outcome = IngestOutcome::default();

    match upload.kind {
        UploadKind::Code => {
            let extracted = extract_code(text);
            outcome.notices = extracted.notices;
            let code = extracted.record;
            outcome.summary = format!(
                "Extracted: {} functions, {} SQL queries",
                code.functions.len(),
                code.queries.len()
            );

            // Each embedded query is also cataloged individually.
            let entries: Vec<QueryEntry> = code
                .queries
                .iter()
                .map(|q| QueryEntry {
                    query_text: q.query.clone(),
                    category: q.kind.to_lowercase(),
                    source_file: upload.filename.to_string(),
                    example_usage: None,
                })
                .collect();

            let doc = CodeDoc {
                filename: upload.filename.to_string(),
                content: text.to_string(),
                functions: code.functions,
                queries: code.queries,
                summary: code.summary,
            };
            record_insert(store, &mut outcome, Collection::CodeDocs, to_value(doc)?)?;
            for entry in entries {
                record_insert(store, &mut outcome, Collection::QueryLibrary, to_value(entry)?)?;
            }
        }

        UploadKind::Sql => {
            let extracted = extract_sql(text);
            outcome.notices = extracted.notices;
            let sql = extracted.record;
            outcome.summary = format!("Extracted: {} SQL queries", sql.queries.len());
            for q in sql.queries {
                let entry = QueryEntry {
                    query_text: q.query,
                    category: q.kind.to_lowercase(),
                    source_file: upload.filename.to_string(),
                    example_usage: Some(format!("Line {} from {}", q.line, upload.filename)),
                };
                record_insert(store, &mut outcome, Collection::QueryLibrary, to_value(entry)?)?;
            }
        }

        UploadKind::Log => {
            // A log upload always yields exactly one error_logs record and
            // exactly one flows record, even when nothing was detected.
            let extracted = extract_log(text);
            outcome.notices = extracted.notices;
            let log = extracted.record;
            outcome.summary = format!("Detected: {} error patterns", log.errors.len());

            let entry = ErrorLog {
                filename: upload.filename.to_string(),
                content: text.to_string(),
                errors: log.errors,
                summary: log.summary,
            };
            record_insert(store, &mut outcome, Collection::ErrorLogs, to_value(entry)?)?;

            let flow = Flow {
                title: format!("Flow from {}", upload.filename),
                source: upload.filename.to_string(),
                diagram_text: synthesize_flow(text),
            };
            record_insert(store, &mut outcome, Collection::Flows, to_value(flow)?)?;
        }

        UploadKind::Sop => {
            let extracted = extract_sop(text, upload.filename);
            outcome.notices = extracted.notices;
            outcome.summary = format!("Parsed: {} procedure steps", extracted.record.step_count);
            record_insert(
                store,
                &mut outcome,
                Collection::SopLibrary,
                to_value(extracted.record)?,
            )?;
        }

        UploadKind::Document => {
            let extracted = extract_document(text, upload.filename);
            outcome.notices = extracted.notices;
            outcome.summary = format!("Stored document '{}'", extracted.record.title);
            record_insert(
                store,
                &mut outcome,
                Collection::Documents,
                to_value(extracted.record)?,
            )?;
        }

        UploadKind::Diagram => {
            let extracted = extract_diagram(text, upload.filename);
            outcome.notices = extracted.notices;
            outcome.summary = format!(
                "Stored diagram with {} elements",
                extracted.record.element_count
            );
            record_insert(
                store,
                &mut outcome,
                Collection::Diagrams,
                to_value(extracted.record)?,
            )?;
        }

        UploadKind::PdfText => {
            file_card(store, &mut outcome, upload, Collection::Documents, "document", &["pdf"])?;
        }
        UploadKind::Image => {
            file_card(store, &mut outcome, upload, Collection::Images, "image", &["image"])?;
        }
        UploadKind::Media => {
            file_card(store, &mut outcome, upload, Collection::Media, "media", &["media"])?;
        }
        UploadKind::Spreadsheet => {
            file_card(
                store,
                &mut outcome,
                upload,
                Collection::Spreadsheets,
                "spreadsheet",
                &["spreadsheet"],
            )?;
        }
        UploadKind::Archive => {
            file_card(store, &mut outcome, upload, Collection::Archives, "archive", &["archive"])?;
        }
        UploadKind::Other => {
            file_card(store, &mut outcome, upload, Collection::OtherFiles, "uncategorized", &[])?;
        }
    }

    Ok(outcome)
}

fn file_card(
    store: &mut Store,
    outcome: &mut IngestOutcome,
    upload: &Upload,
    collection: Collection,
    category: &str,
    tags: &[&str],
) -> Result<()> {
    let extracted = extract_file_card(upload.content, upload.filename, &upload.meta, category, tags);
    outcome.notices = extracted.notices;
    outcome.summary = format!("Stored {} metadata for '{}'", category, extracted.record.title);
    record_insert(store, outcome, collection, to_value(extracted.record)?)
}

fn record_insert(
    store: &mut Store,
    outcome: &mut IngestOutcome,
    collection: Collection,
    record: serde_json::Value,
) -> Result<()> {
    let stored = store.insert(collection, record)?;
    let id = stored
        .get("id")
        .and_then(serde_json::Value::as_str)
        .unwrap_or_default()
        .to_string();
    outcome.inserted.push((collection, id));
    Ok(())
}
