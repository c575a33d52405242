//! Scorer backed by externally supplied match confidences.
//!
//! Another matcher (for instance a language model prompted with headers and
//! sample rows) can emit `(schema_column, source_column, confidence)` triples.
//! Wrapping them in a [`ProvidedMatchScorer`] lets the planner and executor
//! run unchanged on top of those decisions.

use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ProvidedMatchError;
use crate::score::ColumnScorer;

/// One externally decided column correspondence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProvidedMatch {
    pub schema_column: String,
    pub source_column: String,
    pub confidence: f64,
}

/// Scores only the pairs it was given, in either direction.
#[derive(Debug, Clone, Default)]
pub struct ProvidedMatchScorer {
    scores: HashMap<(String, String), f64>,
}

impl ProvidedMatchScorer {
    pub fn new(matches: impl IntoIterator<Item = ProvidedMatch>) -> Self {
        let mut scores = HashMap::new();
        for m in matches {
            let confidence = m.confidence.clamp(-1.0, 1.0);
            scores.insert(
                (m.source_column.clone(), m.schema_column.clone()),
                confidence,
            );
            scores.insert((m.schema_column, m.source_column), confidence);
        }
        Self { scores }
    }

    /// Reads a JSON array of [`ProvidedMatch`] objects.
    pub fn load(path: &Path) -> Result<Self, ProvidedMatchError> {
        let file = File::open(path).map_err(|source| ProvidedMatchError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let matches: Vec<ProvidedMatch> = serde_json::from_reader(BufReader::new(file))
            .map_err(|source| ProvidedMatchError::Json {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(Self::new(matches))
    }

    pub fn len(&self) -> usize {
        self.scores.len() / 2
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }
}

impl ColumnScorer for ProvidedMatchScorer {
    fn score(&self, left: &str, right: &str) -> Option<f64> {
        if left == right {
            return Some(1.0);
        }
        self.scores
            .get(&(left.to_string(), right.to_string()))
            .copied()
    }
}
