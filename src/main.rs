//! # legacykb CLI (`lkb`)
//!
//! The `lkb` binary is the primary interface for legacykb. It provides
//! commands for store initialization, file ingestion, browsing, keyword
//! search, and snapshot export/import/merge.
//!
//! ## Usage
//!
//! ```bash
//! lkb --config ./config/lkb.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `lkb init` | Create the snapshot file |
//! | `lkb ingest --kind <kind> <file>` | Extract and store knowledge from a file |
//! | `lkb list <collection>` | Browse a collection |
//! | `lkb get <collection> <id>` | Retrieve one record as JSON |
//! | `lkb update <collection> <id> <patch>` | Shallow-merge a JSON patch into a record |
//! | `lkb delete <collection> <id>` | Remove a record |
//! | `lkb search "<keyword>"` | Keyword search across collections |
//! | `lkb export [--output <file>]` | Write the full snapshot |
//! | `lkb import <file>` | Replace the store with a snapshot |
//! | `lkb merge <file>` | Append novel records from a snapshot |
//! | `lkb clear` | Reset every collection |
//! | `lkb stats` | Record counts and store size |
//! | `lkb validate` | Structural health check |

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use legacykb::config;
use legacykb::extract_file::FileMeta;
use legacykb::ingest::{ingest, Upload, UploadKind};
use legacykb::search::global_search;
use legacykb::stats::collect_stats;
use legacykb::store::{Collection, Store};

/// legacykb CLI: a local-first knowledge extraction and storage tool for
/// legacy system artifacts.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file; a missing file falls back to built-in defaults.
#[derive(Parser)]
#[command(
    name = "lkb",
    about = "legacykb: extract structured knowledge from legacy code, SQL, logs, and documents",
    version,
    long_about = "legacykb converts heterogeneous uploads (legacy source modules, SQL scripts, \
    application logs, SOPs, diagrams, and binary file metadata) into typed knowledge records \
    kept in a local JSON snapshot store, with keyword search and snapshot export/import/merge."
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/lkb.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Initialize the snapshot file.
    ///
    /// Creates the store file with every collection present and empty.
    /// Idempotent: an existing store is left untouched.
    Init,

    /// Extract and store knowledge from one file.
    ///
    /// Routes the file to the extractor matching its declared kind. A log
    /// upload also derives a sequence-diagram flow record.
    Ingest {
        /// The file to ingest.
        file: PathBuf,

        /// Upload kind: code, sql, log, sop, document, diagram, pdf, image,
        /// media, spreadsheet, archive, or other.
        #[arg(long)]
        kind: String,

        /// MIME type of the file; guessed from the extension when omitted.
        #[arg(long)]
        mime: Option<String>,
    },

    /// Browse all records of one collection, in insertion order.
    List {
        /// Collection name (e.g. `query_library`).
        collection: String,
    },

    /// Retrieve one record as pretty-printed JSON.
    Get {
        collection: String,
        /// Record id.
        id: String,
    },

    /// Shallow-merge a JSON object patch into a record.
    ///
    /// `id` and `created_at` are immutable and ignored in the patch.
    Update {
        collection: String,
        id: String,
        /// The patch, as a JSON object literal.
        patch: String,
    },

    /// Remove one record by id.
    Delete {
        collection: String,
        id: String,
    },

    /// Keyword search across every collection (substring, no ranking).
    Search {
        /// The search keyword.
        keyword: String,
    },

    /// Serialize the entire store to a snapshot file or stdout.
    Export {
        /// Output path; stdout when omitted.
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Replace the entire store with a snapshot file (whole swap).
    ///
    /// The snapshot must contain the five core collections; on any failure
    /// the existing data is left untouched.
    Import {
        /// Snapshot file to import.
        file: PathBuf,
    },

    /// Append records from a snapshot whose ids are not already present.
    ///
    /// Never overwrites existing records.
    Merge {
        /// Snapshot file to merge from.
        file: PathBuf,
    },

    /// Reset every collection to empty.
    Clear,

    /// Show per-collection record counts and store size.
    Stats,

    /// Check the store structure and report problems.
    Validate,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let cfg = config::load_config(&cli.config)?;
    let store_path = &cfg.store.path;

    match cli.command {
        Commands::Init => {
            let store = Store::open(store_path)?;
            store.save()?;
            println!("Store initialized successfully.");
        }
        Commands::Ingest { file, kind, mime } => {
            let kind: UploadKind = kind.parse().map_err(|e: String| anyhow!(e))?;
            let mut store = Store::open(store_path)?;
            run_ingest(&mut store, kind, &file, mime.as_deref())?;
        }
        Commands::List { collection } => {
            let collection = parse_collection(&collection)?;
            let store = Store::open(store_path)?;
            let records = store.select(collection);
            println!("{} ({} records)", collection, records.len());
            for record in records {
                println!(
                    "  id: {}  created: {}  {}",
                    field(record, "id"),
                    field(record, "created_at"),
                    label(record)
                );
            }
        }
        Commands::Get { collection, id } => {
            let collection = parse_collection(&collection)?;
            let store = Store::open(store_path)?;
            let hits = store.query(collection, |r| r.get("id").and_then(|v| v.as_str()) == Some(id.as_str()));
            let record = hits
                .first()
                .ok_or_else(|| anyhow!("record '{}' not found in {}", id, collection))?;
            println!("{}", serde_json::to_string_pretty(record)?);
        }
        Commands::Update {
            collection,
            id,
            patch,
        } => {
            let collection = parse_collection(&collection)?;
            let patch: serde_json::Value =
                serde_json::from_str(&patch).with_context(|| "Failed to parse patch as JSON")?;
            let mut store = Store::open(store_path)?;
            let updated = store.update(collection, &id, patch)?;
            println!("{}", serde_json::to_string_pretty(&updated)?);
        }
        Commands::Delete { collection, id } => {
            let collection = parse_collection(&collection)?;
            let mut store = Store::open(store_path)?;
            store.delete(collection, &id)?;
            println!("deleted {} from {}", id, collection);
        }
        Commands::Search { keyword } => {
            let store = Store::open(store_path)?;
            let hits = global_search(&store, &keyword);
            if hits.is_empty() {
                println!("No results.");
            } else {
                println!("{} results", hits.len());
                for hit in hits {
                    println!(
                        "  [{}] id: {}  {}",
                        hit.collection,
                        field(hit.record, "id"),
                        label(hit.record)
                    );
                }
            }
        }
        Commands::Export { output } => {
            let store = Store::open(store_path)?;
            let json = store.export()?;
            match output {
                Some(path) => {
                    if let Some(parent) = path.parent() {
                        if !parent.as_os_str().is_empty() {
                            std::fs::create_dir_all(parent)?;
                        }
                    }
                    std::fs::write(&path, &json)?;
                    let stats = collect_stats(&store)?;
                    eprintln!(
                        "Exported {} records to {}",
                        stats.total_records,
                        path.display()
                    );
                }
                None => println!("{}", json),
            }
        }
        Commands::Import { file } => {
            let text = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read snapshot: {}", file.display()))?;
            let mut store = Store::open(store_path)?;
            store.import(&text)?;
            println!("import {}", file.display());
            println!("ok");
        }
        Commands::Merge { file } => {
            let text = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read snapshot: {}", file.display()))?;
            let mut store = Store::open(store_path)?;
            let added = store.merge(&text)?;
            println!("merge {}", file.display());
            println!("  records added: {}", added);
            println!("ok");
        }
        Commands::Clear => {
            let mut store = Store::open(store_path)?;
            store.clear()?;
            println!("Store cleared.");
        }
        Commands::Stats => {
            let store = Store::open(store_path)?;
            let stats = collect_stats(&store)?;
            println!("{:<16} {:>8}", "COLLECTION", "RECORDS");
            for (collection, count) in &stats.counts {
                println!("{:<16} {:>8}", collection.as_str(), count);
            }
            println!("{:<16} {:>8}", "total", stats.total_records);
            println!("store size: {} KB", stats.size_kb);
        }
        Commands::Validate => {
            let store = Store::open(store_path)?;
            let problems = store.validate();
            if problems.is_empty() {
                println!("ok");
            } else {
                for problem in &problems {
                    println!("{}", problem);
                }
                anyhow::bail!("validation found {} problems", problems.len());
            }
        }
    }

    Ok(())
}

fn run_ingest(store: &mut Store, kind: UploadKind, file: &Path, mime: Option<&str>) -> Result<()> {
    let bytes = std::fs::read(file)
        .with_context(|| format!("Failed to read file: {}", file.display()))?;
    let filename = file
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| anyhow!("file has no usable name: {}", file.display()))?;

    // Binary uploads may carry no decodable text at all.
    let decoded = String::from_utf8_lossy(&bytes).into_owned();
    let content = if std::str::from_utf8(&bytes).is_ok() || is_text_kind(kind) {
        Some(decoded.as_str())
    } else {
        None
    };

    let upload = Upload {
        kind,
        filename,
        content,
        meta: FileMeta {
            size_bytes: bytes.len() as u64,
            mime: mime
                .map(str::to_string)
                .unwrap_or_else(|| guess_mime(filename).to_string()),
        },
    };

    let outcome = ingest(store, &upload)?;
    println!("ingest {} {}", kind_name(kind), filename);
    println!("  {}", outcome.summary);
    println!("  records written: {}", outcome.inserted.len());
    for notice in &outcome.notices {
        println!("  notice: {}", notice);
    }
    println!("ok");
    Ok(())
}

/// Kinds whose extractors read text even when the bytes are not clean UTF-8.
fn is_text_kind(kind: UploadKind) -> bool {
    matches!(
        kind,
        UploadKind::Code
            | UploadKind::Sql
            | UploadKind::Log
            | UploadKind::Sop
            | UploadKind::Document
            | UploadKind::Diagram
            | UploadKind::PdfText
    )
}

fn kind_name(kind: UploadKind) -> &'static str {
    match kind {
        UploadKind::Code => "code",
        UploadKind::Sql => "sql",
        UploadKind::Log => "log",
        UploadKind::Sop => "sop",
        UploadKind::Document => "document",
        UploadKind::Diagram => "diagram",
        UploadKind::PdfText => "pdf",
        UploadKind::Image => "image",
        UploadKind::Media => "media",
        UploadKind::Spreadsheet => "spreadsheet",
        UploadKind::Archive => "archive",
        UploadKind::Other => "other",
    }
}

fn parse_collection(name: &str) -> Result<Collection> {
    name.parse::<Collection>().map_err(|e| anyhow!(e))
}

/// Best-effort MIME guess from the filename extension.
fn guess_mime(filename: &str) -> &'static str {
    let ext = filename
        .rsplit_once('.')
        .map(|(_, e)| e.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "pdf" => "application/pdf",
        "csv" => "text/csv",
        "xls" | "xlsx" => "application/vnd.ms-excel",
        "zip" => "application/zip",
        "mp3" => "audio/mpeg",
        "mp4" => "video/mp4",
        "txt" | "log" | "sql" | "bas" | "cls" | "vb" | "md" => "text/plain",
        "json" => "application/json",
        "xml" | "drawio" => "application/xml",
        _ => "",
    }
}

/// A short display label for a record: its title, filename, or query text.
fn label(record: &serde_json::Value) -> String {
    for key in ["title", "filename", "query_text", "summary"] {
        if let Some(v) = record.get(key).and_then(|v| v.as_str()) {
            let short: String = v.chars().take(60).collect();
            return short;
        }
    }
    String::new()
}

fn field<'a>(record: &'a serde_json::Value, key: &str) -> &'a str {
    record.get(key).and_then(|v| v.as_str()).unwrap_or("-")
}
