//! Configuration options for matching, planning and execution.

use serde::{Deserialize, Serialize};

/// Which key pairs between two tables are kept as join candidates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyCandidatePolicy {
    /// Pairs scoring at or above this are treated as effectively exact and all
    /// of them are kept. When none reaches it, only the best pair is kept.
    pub exact_threshold: f64,
    /// Upper bound on candidates kept per table pair.
    pub max_candidates: Option<usize>,
}

impl Default for KeyCandidatePolicy {
    fn default() -> Self {
        Self {
            exact_threshold: 0.9,
            max_candidates: None,
        }
    }
}

/// Options controlling an alignment run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlignOptions {
    /// Candidates scoring below this are ignored by the matcher.
    pub min_match_score: Option<f64>,

    pub key_candidates: KeyCandidatePolicy,

    /// Maximum number of key pairs combined into one join condition.
    pub max_join_keys: usize,

    /// Drop duplicate rows when a single table supplies every column.
    pub dedupe_single_table: bool,

    /// Truncate the returned and persisted result to this many rows.
    pub limit_rows: Option<usize>,
}

impl Default for AlignOptions {
    fn default() -> Self {
        Self {
            min_match_score: None,
            key_candidates: KeyCandidatePolicy::default(),
            max_join_keys: 2,
            dedupe_single_table: true,
            limit_rows: None,
        }
    }
}

impl AlignOptions {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_min_match_score(mut self, score: Option<f64>) -> Self {
        self.min_match_score = score;
        self
    }

    #[must_use]
    pub fn with_key_threshold(mut self, threshold: f64) -> Self {
        self.key_candidates.exact_threshold = threshold;
        self
    }

    #[must_use]
    pub fn with_max_join_keys(mut self, keys: usize) -> Self {
        self.max_join_keys = keys.max(1);
        self
    }

    #[must_use]
    pub fn with_limit_rows(mut self, limit: Option<usize>) -> Self {
        self.limit_rows = limit;
        self
    }
}
