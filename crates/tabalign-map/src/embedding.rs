//! Pretrained word embedding lookup.
//!
//! The source format is one token per line followed by its vector, all
//! whitespace separated (`token v1 v2 ... vN`), as distributed for GloVe.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use tracing::info;

use crate::error::EmbeddingError;

/// Read-only token to vector lookup, loaded once per run.
#[derive(Debug, Clone, Default)]
pub struct EmbeddingSpace {
    dimension: usize,
    vectors: HashMap<String, Vec<f32>>,
}

impl EmbeddingSpace {
    /// Loads an embedding file from disk.
    pub fn load(path: &Path) -> Result<Self, EmbeddingError> {
        let file = File::open(path).map_err(|source| EmbeddingError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let space = Self::from_reader(BufReader::new(file), path)?;
        info!(
            path = %path.display(),
            tokens = space.len(),
            dimension = space.dimension,
            "embedding space loaded"
        );
        Ok(space)
    }

    /// Parses embedding lines from any reader. `path` only labels errors.
    pub fn from_reader<R: BufRead>(reader: R, path: &Path) -> Result<Self, EmbeddingError> {
        let mut dimension = 0usize;
        let mut vectors = HashMap::new();
        for (idx, line) in reader.lines().enumerate() {
            let line_no = idx + 1;
            let line = line.map_err(|source| EmbeddingError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            let mut parts = line.split_whitespace();
            let Some(token) = parts.next() else {
                continue;
            };
            let vector = parts
                .map(|value| {
                    value
                        .parse::<f32>()
                        .map_err(|_| EmbeddingError::InvalidValue {
                            path: path.to_path_buf(),
                            line: line_no,
                            value: value.to_string(),
                        })
                })
                .collect::<Result<Vec<f32>, _>>()?;
            if dimension == 0 {
                dimension = vector.len();
            }
            if vector.is_empty() || vector.len() != dimension {
                return Err(EmbeddingError::DimensionMismatch {
                    path: path.to_path_buf(),
                    line: line_no,
                    expected: dimension,
                    found: vector.len(),
                });
            }
            vectors.entry(token.to_string()).or_insert(vector);
        }
        if vectors.is_empty() {
            return Err(EmbeddingError::Empty {
                path: path.to_path_buf(),
            });
        }
        Ok(Self { dimension, vectors })
    }

    /// Builds a space from in-memory entries. Vectors must share one length.
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, Vec<f32>)>,
        S: Into<String>,
    {
        let mut dimension = 0usize;
        let mut vectors = HashMap::new();
        for (token, vector) in entries {
            if dimension == 0 {
                dimension = vector.len();
            }
            if vector.len() == dimension {
                vectors.insert(token.into(), vector);
            }
        }
        Self { dimension, vectors }
    }

    pub fn get(&self, token: &str) -> Option<&[f32]> {
        self.vectors.get(token).map(Vec::as_slice)
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }
}
