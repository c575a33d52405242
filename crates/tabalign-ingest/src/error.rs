//! Error types for source table ingestion.

use std::path::PathBuf;

use tabalign_model::AlignError;
use thiserror::Error;

/// Errors that can occur while discovering, sniffing or loading tables.
#[derive(Debug, Error)]
pub enum IngestError {
    // === File System Errors ===
    /// Directory not found or not readable.
    #[error("directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    /// CSV file not found.
    #[error("CSV file not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Failed to read directory entries.
    #[error("failed to read directory {path}: {source}")]
    DirectoryRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to read file.
    #[error("failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Location is not a local file path.
    #[error("unsupported source location {location}: only local files are read")]
    UnsupportedLocation { location: String },

    // === CSV Parsing Errors ===
    /// File starts with a byte order mark of an encoding other than UTF-8.
    #[error("unsupported encoding {encoding} in {path}")]
    UnsupportedEncoding {
        path: PathBuf,
        encoding: &'static str,
    },

    /// CSV file is empty or has no header row.
    #[error("CSV file is empty: {path}")]
    EmptyCsv { path: PathBuf },

    /// Header row could not be parsed.
    #[error("failed to parse header row of {path}: {source}")]
    HeaderParse {
        path: PathBuf,
        #[source]
        source: ::csv::Error,
    },

    /// Failed to parse CSV with Polars.
    #[error("failed to parse CSV {path}: {message}")]
    CsvParse { path: PathBuf, message: String },

    // === Table Store Errors ===
    /// A table was requested after its frame was released.
    #[error("table '{table}' was already consumed and evicted")]
    Evicted { table: String },

    /// No table with this index exists in the store.
    #[error("unknown table index {index}")]
    UnknownTable { index: usize },
}

impl IngestError {
    /// The file or directory the error concerns, when there is one.
    pub fn location(&self) -> PathBuf {
        match self {
            Self::DirectoryNotFound { path }
            | Self::FileNotFound { path }
            | Self::DirectoryRead { path, .. }
            | Self::FileRead { path, .. }
            | Self::UnsupportedEncoding { path, .. }
            | Self::EmptyCsv { path }
            | Self::HeaderParse { path, .. }
            | Self::CsvParse { path, .. } => path.clone(),
            Self::UnsupportedLocation { location } => PathBuf::from(location),
            Self::Evicted { table } => PathBuf::from(table),
            Self::UnknownTable { index } => PathBuf::from(format!("#{index}")),
        }
    }
}

impl From<IngestError> for AlignError {
    fn from(err: IngestError) -> Self {
        match err {
            IngestError::Evicted { table } => AlignError::TableEvicted { table },
            other => AlignError::parse(other.location(), &other),
        }
    }
}

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestError>;
