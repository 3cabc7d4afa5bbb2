//! Core data models for legacykb.
//!
//! These types are the shapes of the records that extractors produce and the
//! knowledge store persists. Stored records additionally carry an `id` and a
//! `created_at` field, both assigned by the store at insert time.

use serde::{Deserialize, Serialize};

/// Extractor output: the derived value plus any degradation notices.
///
/// Extractors are best-effort by design and never fail; when an expected
/// pattern is absent they fall back to a documented default and record a
/// notice here so callers can surface warnings without aborting the upload.
#[derive(Debug, Clone)]
pub struct Extracted<T> {
    pub record: T,
    pub notices: Vec<String>,
}

impl<T> Extracted<T> {
    pub fn clean(record: T) -> Self {
        Self {
            record,
            notices: Vec::new(),
        }
    }

    pub fn with_notices(record: T, notices: Vec<String>) -> Self {
        Self { record, notices }
    }
}

/// Kind of routine found in a source module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoutineKind {
    /// A procedure with no return value (`Sub` in the source dialect).
    Routine,
    /// A value-returning routine.
    Function,
}

/// A routine declaration found in uploaded source code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionRecord {
    pub name: String,
    pub kind: RoutineKind,
    /// 1-based line number of the declaration.
    pub line: usize,
}

/// A SQL statement found in source code or a SQL script.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryRecord {
    pub query: String,
    /// Uppercased statement verb (`SELECT`, `INSERT`, ...).
    pub kind: String,
    /// 1-based line number where the statement begins.
    pub line: usize,
}

/// A classified error line from an uploaded log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorRecord {
    /// The matched line, trimmed.
    pub pattern: String,
    /// 1-based line number.
    pub line: usize,
    pub category: String,
    pub root_cause: String,
}

/// One step of a standard operating procedure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SopStep {
    pub number: usize,
    pub title: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
}

/// Stored record for one uploaded source module (`code_docs`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodeDoc {
    pub filename: String,
    pub content: String,
    pub functions: Vec<FunctionRecord>,
    pub queries: Vec<QueryRecord>,
    pub summary: String,
}

/// Stored record for one SQL statement (`query_library`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryEntry {
    pub query_text: String,
    /// Lowercased statement verb.
    pub category: String,
    pub source_file: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example_usage: Option<String>,
}

/// Stored record for one uploaded log file's findings (`error_logs`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorLog {
    pub filename: String,
    pub content: String,
    pub errors: Vec<ErrorRecord>,
    pub summary: String,
}

/// Stored record for one procedure document (`sop_library`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SopDoc {
    pub title: String,
    pub category: String,
    pub steps: Vec<SopStep>,
    pub step_count: usize,
    pub content: String,
}

/// Stored record for one diagram (`flows`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Flow {
    pub title: String,
    /// Originating filename, or `"manual"` for hand-authored flows.
    pub source: String,
    /// Sequence-diagram script consumed by the external renderer.
    pub diagram_text: String,
}

/// Stored record for a free-form document (`documents`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentCard {
    pub title: String,
    pub category: String,
    pub tags: Vec<String>,
    pub description: String,
    /// Bounded preview of the document body.
    pub content: String,
}

/// Stored record for diagram markup (`diagrams`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagramCard {
    pub title: String,
    /// Source format, derived from the filename extension.
    pub format: String,
    pub element_count: usize,
    pub description: String,
}

/// Stored metadata record for binary-ish uploads
/// (`images`, `media`, `spreadsheets`, `archives`, `other_files`, PDF text).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileCard {
    pub title: String,
    pub category: String,
    pub tags: Vec<String>,
    pub size_bytes: u64,
    pub mime: String,
    /// Bounded content preview, empty when no text is available.
    pub preview: String,
}

/// Code extractor result: functions and queries found in one module.
#[derive(Debug, Clone)]
pub struct CodeExtraction {
    pub functions: Vec<FunctionRecord>,
    pub queries: Vec<QueryRecord>,
    pub summary: String,
}

/// SQL file extractor result.
#[derive(Debug, Clone)]
pub struct SqlExtraction {
    pub queries: Vec<QueryRecord>,
    pub summary: String,
}

/// Log extractor result.
#[derive(Debug, Clone)]
pub struct LogExtraction {
    pub errors: Vec<ErrorRecord>,
    pub summary: String,
}
