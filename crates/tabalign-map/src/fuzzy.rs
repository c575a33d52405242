//! Character-level fallback scorer.
//!
//! Uses Jaro-Winkler similarity on normalized names. It needs no external
//! vocabulary, so it is the scorer of choice when no embedding file is at hand.

use rapidfuzz::distance::jaro_winkler;

use crate::score::{ColumnScorer, PHRASE_SEPARATORS};

/// Jaro-Winkler scorer over normalized column names.
#[derive(Debug, Clone, Copy, Default)]
pub struct FuzzyScorer;

impl FuzzyScorer {
    pub fn new() -> Self {
        Self
    }
}

impl ColumnScorer for FuzzyScorer {
    fn score(&self, left: &str, right: &str) -> Option<f64> {
        let normalized_left = normalize(left);
        let normalized_right = normalize(right);
        if normalized_left.is_empty() || normalized_right.is_empty() {
            return (left == right).then_some(1.0);
        }
        Some(jaro_winkler::similarity(
            normalized_left.chars(),
            normalized_right.chars(),
        ))
    }
}

/// Lower-cases, folds separators to single spaces and trims.
fn normalize(raw: &str) -> String {
    raw.trim()
        .to_lowercase()
        .replace(PHRASE_SEPARATORS, " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
