//! Candidate join keys between two tables.

use tabalign_map::ColumnScorer;
use tabalign_model::{KeyCandidate, KeyCandidatePolicy, TableHeaders};
use tracing::debug;

/// Scores every column pair of two tables and keeps the plausible keys.
///
/// Identical names score 1.0 whatever the scorer says. All pairs at or above
/// the policy threshold are kept; when none reaches it, only the single best
/// pair is. The result is ordered by score, then left column order, then right
/// column order.
pub fn key_candidates(
    scorer: &dyn ColumnScorer,
    left: &TableHeaders,
    right: &TableHeaders,
    policy: &KeyCandidatePolicy,
) -> Vec<KeyCandidate> {
    let mut scored = Vec::new();
    for left_column in left.columns.iter().filter(|c| !c.is_empty()) {
        for right_column in right.columns.iter().filter(|c| !c.is_empty()) {
            let score = if left_column == right_column {
                Some(1.0)
            } else {
                scorer.score(left_column, right_column)
            };
            if let Some(score) = score {
                scored.push(KeyCandidate {
                    left_column: left_column.clone(),
                    right_column: right_column.clone(),
                    score,
                });
            }
        }
    }
    scored.sort_by(|a, b| b.score.total_cmp(&a.score));

    let exact = scored
        .iter()
        .take_while(|c| c.score >= policy.exact_threshold)
        .count();
    let keep = if exact > 0 { exact } else { scored.len().min(1) };
    scored.truncate(policy.max_candidates.map_or(keep, |cap| keep.min(cap)));

    debug!(
        left = %left.name,
        right = %right.name,
        candidates = scored.len(),
        best = scored.first().map(|c| c.score),
        "key candidates scored"
    );
    scored
}
