//! Error types for scorer construction.

use std::path::PathBuf;

use thiserror::Error;

/// Errors from loading an embedding space.
#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("failed to read embedding file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid vector component '{value}' at line {line} of {path}")]
    InvalidValue {
        path: PathBuf,
        line: usize,
        value: String,
    },

    #[error("line {line} of {path} has {found} components, expected {expected}")]
    DimensionMismatch {
        path: PathBuf,
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("embedding file {path} contains no vectors")]
    Empty { path: PathBuf },
}

/// Errors from loading externally provided matches.
#[derive(Debug, Error)]
pub enum ProvidedMatchError {
    #[error("failed to read match file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse match file {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
