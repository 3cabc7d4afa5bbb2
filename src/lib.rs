//! # legacykb
//!
//! A local-first knowledge extraction and storage tool for legacy system
//! artifacts.
//!
//! legacykb turns heterogeneous uploads (legacy source modules, SQL
//! scripts, application logs, SOP documents, diagram markup, and
//! metadata-only binaries) into typed, searchable knowledge records kept in
//! a multi-collection JSON snapshot store. Log uploads additionally yield a
//! derived sequence-diagram flow.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────┐   ┌─────────────┐   ┌───────────────┐
//! │  Uploads    │──▶│  Extractors  │──▶│ Knowledge     │
//! │ code/sql/.. │   │ + Flow synth │   │ Store (JSON)  │
//! └────────────┘   └─────────────┘   └──────┬────────┘
//!                                           │
//!                               ┌───────────┴──────────┐
//!                               ▼                      ▼
//!                          ┌─────────┐          ┌────────────┐
//!                          │   CLI   │          │ export /   │
//!                          │  (lkb)  │          │ import /   │
//!                          └─────────┘          │ merge      │
//!                                               └────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! lkb init                         # create the snapshot file
//! lkb ingest --kind code mod1.bas  # extract routines + embedded SQL
//! lkb ingest --kind log batch.log  # classify errors + derive a flow
//! lkb search "price"               # keyword search across collections
//! lkb export --output backup.json  # full snapshot export
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Core record types |
//! | [`patterns`] | Fixed pattern library (error triples, statement keywords) |
//! | [`extract_code`] | Source module extractor |
//! | [`extract_sql`] | SQL script extractor |
//! | [`extract_log`] | Log classifier |
//! | [`extract_sop`] | SOP step extractor |
//! | [`extract_doc`] | Document and diagram extractors |
//! | [`extract_file`] | Metadata-only extractor for binary kinds |
//! | [`flow`] | Sequence-diagram flow synthesizer |
//! | [`store`] | Multi-collection knowledge store |
//! | [`ingest`] | Upload routing and persistence |
//! | [`search`] | Global keyword search |
//! | [`stats`] | Store statistics |

pub mod config;
pub mod extract_code;
pub mod extract_doc;
pub mod extract_file;
pub mod extract_log;
pub mod extract_sop;
pub mod extract_sql;
pub mod flow;
pub mod ingest;
pub mod models;
pub mod patterns;
pub mod search;
pub mod stats;
pub mod store;
