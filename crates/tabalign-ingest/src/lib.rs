//! Source table ingestion.
//!
//! This crate reads the headers of candidate source tables, detects their
//! delimiter, and loads their rows into Polars DataFrames on demand.
//!
//! # Features
//!
//! - **Delimiter sniffing**: comma, semicolon or tab, detected from a sample
//! - **Header normalization**: trimmed, BOM-free, unique column names
//! - **Table store**: arena of tables loaded lazily and at most once
//! - **Discovery**: expand directories into their CSV files
//!
//! # Example
//!
//! ```ignore
//! use std::path::Path;
//! use tabalign_ingest::{TableStore, expand_sources};
//!
//! let files = expand_sources(&[Path::new("data/")])?;
//! let mut store = TableStore::open(&files)?;
//! let headers = store.headers();
//! let df = store.load(headers[0].id)?;
//! ```

mod csv;
mod discovery;
mod error;
mod store;

// === Error Types ===
pub use error::{IngestError, Result};

// === CSV Reading ===
pub use csv::{
    CsvHeaders, DELIMITER_CANDIDATES, dedupe_headers, read_csv_schema, read_csv_table,
    sniff_delimiter,
};

// === File Discovery ===
pub use discovery::{expand_sources, is_remote_location, list_csv_files};

// === Table Store ===
pub use store::{SourceTable, TableState, TableStore};
