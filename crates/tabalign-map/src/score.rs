//! Column-name similarity scoring.
//!
//! A [`ColumnScorer`] compares two column names and either returns a score in
//! [-1, 1] or declines with `None` ("no candidate"). Declined pairs are left out
//! of rankings entirely rather than scored as zero.

use std::collections::BTreeSet;
use std::sync::{Mutex, PoisonError};

use tracing::debug;

use crate::embedding::EmbeddingSpace;

/// Characters, besides whitespace, that split a column name into tokens.
pub const PHRASE_SEPARATORS: &[char] = &[',', ';', ':', '/', '!', '.', '_', '-'];

/// A candidate column and its score against some target name.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedColumn {
    pub column: String,
    pub score: f64,
}

/// Scores similarity between two column names.
///
/// Implementations are interchangeable: the matcher and join planner only see
/// scores, not how they were produced.
pub trait ColumnScorer: Send + Sync {
    /// Similarity between `left` and `right`, or `None` when the pair cannot
    /// be scored.
    fn score(&self, left: &str, right: &str) -> Option<f64>;

    /// Scores `target` against every candidate, best first.
    ///
    /// Candidates the scorer declines are dropped. Ties keep candidate order.
    fn rank(&self, target: &str, candidates: &[String]) -> Vec<RankedColumn> {
        let mut ranked: Vec<RankedColumn> = candidates
            .iter()
            .filter_map(|candidate| {
                self.score(target, candidate).map(|score| RankedColumn {
                    column: candidate.clone(),
                    score,
                })
            })
            .collect();
        ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
        ranked
    }
}

/// Splits a phrase into lower-cased tokens.
pub fn phrase_tokens(phrase: &str) -> Vec<String> {
    phrase
        .split(|ch: char| ch.is_whitespace() || PHRASE_SEPARATORS.contains(&ch))
        .filter(|token| !token.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Cosine similarity, `None` when either vector has zero length.
pub fn cosine_similarity(left: &[f64], right: &[f64]) -> Option<f64> {
    if left == right {
        return left.iter().any(|v| *v != 0.0).then_some(1.0);
    }
    let mut dot = 0.0;
    let mut left_norm = 0.0;
    let mut right_norm = 0.0;
    for (l, r) in left.iter().zip(right) {
        dot += l * r;
        left_norm += l * l;
        right_norm += r * r;
    }
    if left_norm == 0.0 || right_norm == 0.0 {
        return None;
    }
    Some((dot / (left_norm.sqrt() * right_norm.sqrt())).clamp(-1.0, 1.0))
}

/// Scores column names by the cosine similarity of their phrase embeddings.
///
/// A phrase embedding is the sum of the vectors of its known tokens. Names
/// with no known token are compared by exact string equality instead, which
/// lets technical identifiers match themselves.
#[derive(Debug)]
pub struct PhraseScorer {
    space: EmbeddingSpace,
    unknown_tokens: Mutex<BTreeSet<String>>,
}

impl PhraseScorer {
    pub fn new(space: EmbeddingSpace) -> Self {
        Self {
            space,
            unknown_tokens: Mutex::new(BTreeSet::new()),
        }
    }

    pub fn space(&self) -> &EmbeddingSpace {
        &self.space
    }

    /// Sum of known token vectors, or `None` if no token is known.
    pub fn embed(&self, phrase: &str) -> Option<Vec<f64>> {
        let mut embedding: Option<Vec<f64>> = None;
        for token in phrase_tokens(phrase) {
            let Some(vector) = self.space.get(&token) else {
                self.note_unknown(token);
                continue;
            };
            let sum = embedding.get_or_insert_with(|| vec![0.0; vector.len()]);
            for (acc, value) in sum.iter_mut().zip(vector) {
                *acc += f64::from(*value);
            }
        }
        embedding
    }

    /// Similarity of two names; see [`ColumnScorer::score`].
    pub fn similarity(&self, left: &str, right: &str) -> Option<f64> {
        match (self.embed(left), self.embed(right)) {
            (None, None) => (left == right).then_some(1.0),
            (Some(l), Some(r)) => cosine_similarity(&l, &r),
            _ => None,
        }
    }

    /// Tokens seen so far that are missing from the embedding space.
    pub fn unknown_tokens(&self) -> Vec<String> {
        self.unknown_tokens
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .cloned()
            .collect()
    }

    fn note_unknown(&self, token: String) {
        let mut seen = self
            .unknown_tokens
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if !seen.contains(&token) {
            debug!(token = %token, "token not in embedding space");
            seen.insert(token);
        }
    }
}

impl ColumnScorer for PhraseScorer {
    fn score(&self, left: &str, right: &str) -> Option<f64> {
        self.similarity(left, right)
    }
}
