//! The knowledge store: a multi-collection record store persisted as one
//! JSON snapshot file.
//!
//! Records are plain JSON objects. The store assigns `id` (UUID v4) and
//! `created_at` (RFC 3339 UTC) at insert time; both are immutable
//! afterwards. Every mutating operation rewrites the complete serialized
//! snapshot, written to a temporary file and renamed into place so a partial
//! write is never observable to a subsequent read. When the write fails the
//! in-memory state is restored as well, so a failed mutation cannot leak
//! into a later successful persist.
//!
//! The store is an injected handle: open one against a path, or use
//! [`Store::in_memory`] in tests. There is no process-global state.

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::str::FromStr;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

/// The closed set of collections the store knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Collection {
    CodeDocs,
    QueryLibrary,
    ErrorLogs,
    SopLibrary,
    Flows,
    Documents,
    Diagrams,
    Images,
    Media,
    Spreadsheets,
    Archives,
    OtherFiles,
}

impl Collection {
    pub const ALL: [Collection; 12] = [
        Collection::CodeDocs,
        Collection::QueryLibrary,
        Collection::ErrorLogs,
        Collection::SopLibrary,
        Collection::Flows,
        Collection::Documents,
        Collection::Diagrams,
        Collection::Images,
        Collection::Media,
        Collection::Spreadsheets,
        Collection::Archives,
        Collection::OtherFiles,
    ];

    /// Collections a snapshot must contain to be importable.
    pub const REQUIRED: [Collection; 5] = [
        Collection::CodeDocs,
        Collection::QueryLibrary,
        Collection::ErrorLogs,
        Collection::SopLibrary,
        Collection::Flows,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::CodeDocs => "code_docs",
            Collection::QueryLibrary => "query_library",
            Collection::ErrorLogs => "error_logs",
            Collection::SopLibrary => "sop_library",
            Collection::Flows => "flows",
            Collection::Documents => "documents",
            Collection::Diagrams => "diagrams",
            Collection::Images => "images",
            Collection::Media => "media",
            Collection::Spreadsheets => "spreadsheets",
            Collection::Archives => "archives",
            Collection::OtherFiles => "other_files",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Collection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Collection::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| {
                let names: Vec<&str> = Collection::ALL.iter().map(|c| c.as_str()).collect();
                format!("unknown collection '{}'. Available: {}", s, names.join(", "))
            })
    }
}

/// Store error taxonomy. Persistence and format errors are surfaced to the
/// caller verbatim; nothing is retried.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The persistence medium is unavailable or full.
    #[error("persistence failure: {0}")]
    Persistence(String),

    /// Update or delete addressed an id that does not exist.
    #[error("record '{id}' not found in {collection}")]
    NotFound { collection: Collection, id: String },

    /// An imported snapshot is unparsable or missing required collections.
    #[error("invalid snapshot format: {0}")]
    InvalidFormat(String),
}

impl From<io::Error> for StoreError {
    fn from(e: io::Error) -> Self {
        StoreError::Persistence(e.to_string())
    }
}

/// A full serialized copy of every collection: the export/import/merge unit.
///
/// Serializes as a single JSON object whose top-level keys are collection
/// names and whose values are ordered record lists. Unknown extra keys from
/// an imported snapshot are preserved.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Snapshot {
    pub collections: BTreeMap<String, Vec<Value>>,
}

impl Snapshot {
    /// A snapshot with every known collection present and empty.
    pub fn empty() -> Self {
        let mut collections = BTreeMap::new();
        for c in Collection::ALL {
            collections.insert(c.as_str().to_string(), Vec::new());
        }
        Self { collections }
    }

    /// Parse and validate a snapshot from JSON text.
    ///
    /// Requires the five core collection keys; fails with
    /// [`StoreError::InvalidFormat`] otherwise.
    pub fn from_json(text: &str) -> Result<Self, StoreError> {
        let mut snapshot: Snapshot = serde_json::from_str(text)
            .map_err(|e| StoreError::InvalidFormat(e.to_string()))?;
        for c in Collection::REQUIRED {
            if !snapshot.collections.contains_key(c.as_str()) {
                return Err(StoreError::InvalidFormat(format!(
                    "missing required collection '{}'",
                    c
                )));
            }
        }
        // Non-core known collections may be absent; create them empty.
        for c in Collection::ALL {
            snapshot
                .collections
                .entry(c.as_str().to_string())
                .or_default();
        }
        Ok(snapshot)
    }

    pub fn records(&self, collection: Collection) -> &[Value] {
        self.collections
            .get(collection.as_str())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

/// Handle to one knowledge store.
pub struct Store {
    path: Option<PathBuf>,
    data: Snapshot,
}

impl Store {
    /// Open a store backed by a snapshot file. A missing file starts empty;
    /// an unreadable or unparsable file is an error.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let data = match fs::read_to_string(&path) {
            Ok(text) => Snapshot::from_json(&text)?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => Snapshot::empty(),
            Err(e) => return Err(StoreError::Persistence(e.to_string())),
        };
        Ok(Self {
            path: Some(path),
            data,
        })
    }

    /// An unbacked store for tests and dry runs. Nothing is persisted.
    pub fn in_memory() -> Self {
        Self {
            path: None,
            data: Snapshot::empty(),
        }
    }

    /// All records of a collection, in insertion order.
    pub fn select(&self, collection: Collection) -> &[Value] {
        self.data.records(collection)
    }

    /// Assign `id` and `created_at`, append, persist, and return the stored
    /// record. The partial record must be a JSON object.
    pub fn insert(&mut self, collection: Collection, record: Value) -> Result<Value, StoreError> {
        let mut obj = match record {
            Value::Object(map) => map,
            other => {
                return Err(StoreError::InvalidFormat(format!(
                    "record must be a JSON object, got {}",
                    json_kind(&other)
                )))
            }
        };
        obj.insert("id".to_string(), Value::String(Uuid::new_v4().to_string()));
        obj.insert(
            "created_at".to_string(),
            Value::String(Utc::now().to_rfc3339()),
        );
        let stored = Value::Object(obj);
        let previous = self.data.clone();
        self.rows_mut(collection).push(stored.clone());
        self.persist_or_restore(previous)?;
        Ok(stored)
    }

    /// Shallow-merge `patch` into the record with the given id and return the
    /// updated record. `id` and `created_at` in the patch are ignored.
    pub fn update(
        &mut self,
        collection: Collection,
        id: &str,
        patch: Value,
    ) -> Result<Value, StoreError> {
        let patch = match patch {
            Value::Object(map) => map,
            other => {
                return Err(StoreError::InvalidFormat(format!(
                    "patch must be a JSON object, got {}",
                    json_kind(&other)
                )))
            }
        };

        let previous = self.data.clone();
        let rows = self.rows_mut(collection);
        let row = rows
            .iter_mut()
            .find(|r| record_id(r) == Some(id))
            .ok_or_else(|| StoreError::NotFound {
                collection,
                id: id.to_string(),
            })?;

        if let Value::Object(existing) = row {
            for (key, value) in patch {
                if key == "id" || key == "created_at" {
                    continue;
                }
                existing.insert(key, value);
            }
        }
        let updated = row.clone();
        self.persist_or_restore(previous)?;
        Ok(updated)
    }

    /// Remove the record with the given id.
    pub fn delete(&mut self, collection: Collection, id: &str) -> Result<(), StoreError> {
        let previous = self.data.clone();
        let rows = self.rows_mut(collection);
        let before = rows.len();
        rows.retain(|r| record_id(r) != Some(id));
        if rows.len() == before {
            return Err(StoreError::NotFound {
                collection,
                id: id.to_string(),
            });
        }
        self.persist_or_restore(previous)
    }

    /// Records of a collection matching a predicate.
    pub fn query<'a, F>(&'a self, collection: Collection, predicate: F) -> Vec<&'a Value>
    where
        F: Fn(&Value) -> bool,
    {
        self.select(collection)
            .iter()
            .filter(|r| predicate(r))
            .collect()
    }

    /// Serialize the entire store to a pretty-printed snapshot blob.
    pub fn export(&self) -> Result<String, StoreError> {
        serde_json::to_string_pretty(&self.data)
            .map_err(|e| StoreError::Persistence(e.to_string()))
    }

    /// Replace the entire store with a validated snapshot (whole swap, not a
    /// merge). On any failure the existing data is left untouched.
    pub fn import(&mut self, text: &str) -> Result<(), StoreError> {
        let snapshot = Snapshot::from_json(text)?;
        let previous = std::mem::replace(&mut self.data, snapshot);
        self.persist_or_restore(previous)
    }

    /// Append external records whose ids are not already present, collection
    /// by collection. Never overwrites. Returns the number of records added.
    ///
    /// Unlike [`import`](Store::import), merge input needs no required keys:
    /// any known collection key holding an array contributes records.
    pub fn merge(&mut self, text: &str) -> Result<usize, StoreError> {
        let external: Value = serde_json::from_str(text)
            .map_err(|e| StoreError::InvalidFormat(e.to_string()))?;
        let external = external.as_object().ok_or_else(|| {
            StoreError::InvalidFormat("snapshot must be a JSON object".to_string())
        })?;

        let previous = self.data.clone();
        let mut added = 0usize;
        for collection in Collection::ALL {
            let Some(Value::Array(items)) = external.get(collection.as_str()) else {
                continue;
            };
            let existing: HashSet<String> = self
                .select(collection)
                .iter()
                .filter_map(|r| record_id(r).map(str::to_string))
                .collect();
            let rows = self.rows_mut(collection);
            for item in items {
                let duplicate = record_id(item).is_some_and(|id| existing.contains(id));
                if !duplicate {
                    rows.push(item.clone());
                    added += 1;
                }
            }
        }
        self.persist_or_restore(previous)?;
        Ok(added)
    }

    /// Reset every collection to empty.
    pub fn clear(&mut self) -> Result<(), StoreError> {
        let previous = std::mem::replace(&mut self.data, Snapshot::empty());
        self.persist_or_restore(previous)
    }

    /// Structural health check: required collections present, every record
    /// an object with a non-empty string id. Returns one message per problem.
    pub fn validate(&self) -> Vec<String> {
        let mut problems = Vec::new();
        for c in Collection::REQUIRED {
            if !self.data.collections.contains_key(c.as_str()) {
                problems.push(format!("missing collection: {}", c));
            }
        }
        for c in Collection::ALL {
            for (index, record) in self.select(c).iter().enumerate() {
                if !record.is_object() {
                    problems.push(format!("{}[{}] is not an object", c, index));
                } else if record_id(record).map_or(true, str::is_empty) {
                    problems.push(format!("{}[{}] missing id", c, index));
                }
            }
        }
        problems
    }

    /// The current snapshot, for stats and search.
    pub fn snapshot(&self) -> &Snapshot {
        &self.data
    }

    /// Write the current snapshot out immediately. Lets `init` create the
    /// backing file without touching any data.
    pub fn save(&self) -> Result<(), StoreError> {
        self.persist()
    }

    /// Persist the current state; on failure restore `previous` so the
    /// failed mutation never reaches a later successful write.
    fn persist_or_restore(&mut self, previous: Snapshot) -> Result<(), StoreError> {
        if let Err(e) = self.persist() {
            self.data = previous;
            return Err(e);
        }
        Ok(())
    }

    fn rows_mut(&mut self, collection: Collection) -> &mut Vec<Value> {
        self.data
            .collections
            .entry(collection.as_str().to_string())
            .or_default()
    }

    /// Write the complete serialized snapshot. Temp-file-then-rename keeps a
    /// crash from leaving a half-written snapshot behind.
    fn persist(&self) -> Result<(), StoreError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(&self.data)
            .map_err(|e| StoreError::Persistence(e.to_string()))?;
        let tmp = path.with_extension("tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, path)?;
        Ok(())
    }
}

fn record_id(record: &Value) -> Option<&str> {
    record.get("id").and_then(Value::as_str)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
