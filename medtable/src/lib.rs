//! # Medtable - searchable medication tables from CSV exports
//!
//! Medtable loads a delimited medication export (EMA listings, in-house
//! drug lists), maps its headers onto a schema, cleans every cell and
//! serves filtered, sorted and paginated views over the result.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  CSV export │────▶│   Ingest    │────▶│   Dataset   │────▶│  View/Page  │
//! │ (file/URL)  │     │ (enc, `;,`) │     │ (normalized)│     │ (filter/sort│
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use medtable::{paginate, apply, load, Schema, Source, ViewState};
//!
//! #[tokio::main]
//! async fn main() {
//!     let schema = Schema::preset("ema").unwrap();
//!     let dataset = load(&Source::parse("data/medications.csv"), &schema).await.unwrap();
//!     let view = apply(&dataset, &schema, &ViewState::default());
//!     let page = paginate(&view, 1, 50);
//!     println!("{}", page.summary());
//! }
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Ingestion and configuration errors
//! - [`logs`] - Log broadcaster shared by every stage
//! - [`config`] - Defaults and environment settings
//! - [`text`] - Normalizer, sentence splitter, collation
//! - [`schema`] - Canonical fields, aliases and presets
//! - [`models`] - Record, Dataset, CsvInfo
//! - [`parser`] - Encoding and delimiter detection
//! - [`ingest`] - Fetch + parse + map into a Dataset
//! - [`view`] - Filter/sort pipeline, pager, grouper
//! - [`session`] - Load lifecycle and view state

// Core modules
pub mod config;
pub mod error;
pub mod logs;
pub mod models;

// Text handling
pub mod text;

// Loading
pub mod schema;
pub mod parser;
pub mod ingest;

// Presentation state
pub mod view;
pub mod session;

// =============================================================================
// Re-exports - Errors
// =============================================================================

pub use error::{ConfigError, ConfigResult, IngestError, IngestResult};

// =============================================================================
// Re-exports - Models and Schema
// =============================================================================

pub use models::{CsvInfo, Dataset, Record};
pub use schema::{FieldSpec, FilterSpec, GroupSpec, Schema};

// =============================================================================
// Re-exports - Text
// =============================================================================

pub use text::{collation_key, normalize, split, Normalizer};

// =============================================================================
// Re-exports - Ingestion
// =============================================================================

pub use ingest::{fetch, ingest, ingest_bytes, load, ColumnMapping, Source};
pub use parser::{detect_delimiter, detect_encoding, ParseResult};

// =============================================================================
// Re-exports - View
// =============================================================================

pub use view::{
    apply,
    filter_options,
    group_by,
    paginate,
    FilterOptions,
    Group,
    Page,
    Selection,
    SortDirection,
    View,
    ViewState,
};

pub use session::{LoadStatus, LoadTicket, Session};
pub use config::AppConfig;
