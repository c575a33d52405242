//! Join planning over the tables that supply schema columns.

use std::collections::{BTreeMap, BTreeSet};

use tabalign_map::ColumnScorer;
use tabalign_model::{
    AlignError, AlignOptions, FileAssignment, JoinEdge, JoinPlan, KeyCandidatePolicy, Plan,
    Result, TableHeaders, TableId,
};
use tracing::{info, info_span, warn};

use crate::keys::key_candidates;

/// Decides which tables are joined and on which candidate keys.
///
/// The plan is similarity-greedy rather than optimal: starting from the best
/// scoring table pair, it repeatedly attaches the unconnected table with the
/// best key candidate to any connected table.
pub struct JoinPlanner<'a> {
    scorer: &'a dyn ColumnScorer,
    policy: KeyCandidatePolicy,
}

impl<'a> JoinPlanner<'a> {
    pub fn new(scorer: &'a dyn ColumnScorer, options: &AlignOptions) -> Self {
        Self {
            scorer,
            policy: options.key_candidates,
        }
    }

    /// Plans the run for an assignment over the given tables.
    ///
    /// Tables absent from the assignment are ignored. Fails with
    /// [`AlignError::DisconnectedJoinGraph`] when some assigned table cannot be
    /// connected to the others.
    pub fn plan(&self, assignment: &FileAssignment, tables: &[TableHeaders]) -> Result<Plan> {
        let _span = info_span!("plan", tables = assignment.len()).entered();

        if assignment.is_empty() {
            return Err(AlignError::EmptySchema);
        }
        if let Some(table) = assignment.single_table() {
            info!(table = %table, "single source table, no join needed");
            return Ok(Plan::Single(table));
        }

        let relevant: Vec<&TableHeaders> = tables
            .iter()
            .filter(|t| assignment.contains(t.id))
            .collect();
        let excluded = tables.len() - relevant.len();
        if excluded > 0 {
            info!(excluded, "tables without assigned columns left out of the join");
        }

        let mut pairs: Vec<JoinEdge> = Vec::new();
        for (i, left) in relevant.iter().enumerate() {
            for right in &relevant[i + 1..] {
                let candidates = key_candidates(self.scorer, left, right, &self.policy);
                if !candidates.is_empty() {
                    pairs.push(JoinEdge {
                        left: left.id,
                        right: right.id,
                        candidates,
                    });
                }
            }
        }
        pairs.sort_by(|a, b| best_score(b).total_cmp(&best_score(a)));

        let names: BTreeMap<TableId, String> =
            relevant.iter().map(|t| (t.id, t.name.clone())).collect();
        let (connected, edges) = connect(&pairs, relevant.first().map(|t| t.id));

        let orphaned: Vec<String> = names
            .iter()
            .filter(|(id, _)| !connected.contains(id))
            .map(|(_, name)| name.clone())
            .collect();
        if !orphaned.is_empty() {
            warn!(orphaned = ?orphaned, "assigned tables cannot be connected");
            return Err(AlignError::DisconnectedJoinGraph { orphaned });
        }

        let plan = JoinPlan::new(names, edges);
        for edge in plan.edges() {
            info!(
                left = plan.name(edge.left),
                right = plan.name(edge.right),
                keys = edge.candidates.len(),
                score = best_score(edge),
                "join edge planned"
            );
        }
        Ok(Plan::Join(plan))
    }
}

fn best_score(edge: &JoinEdge) -> f64 {
    edge.candidates
        .first()
        .map_or(f64::NEG_INFINITY, |c| c.score)
}

/// Grows a connected set from the best pair, best remaining pair first.
///
/// `pairs` must be sorted best first. When there are no pairs at all the set
/// is seeded with `fallback` so the remaining tables are reported as orphans.
fn connect(
    pairs: &[JoinEdge],
    fallback: Option<TableId>,
) -> (BTreeSet<TableId>, Vec<JoinEdge>) {
    let mut connected = BTreeSet::new();
    let mut edges = Vec::new();
    let mut used = vec![false; pairs.len()];

    match pairs.first() {
        Some(seed) => {
            connected.insert(seed.left);
            connected.insert(seed.right);
            edges.push(seed.clone());
            used[0] = true;
        }
        None => connected.extend(fallback),
    }

    loop {
        let next = pairs.iter().enumerate().find(|(index, pair)| {
            !used[*index] && (connected.contains(&pair.left) != connected.contains(&pair.right))
        });
        let Some((index, pair)) = next else {
            break;
        };
        used[index] = true;
        connected.insert(pair.left);
        connected.insert(pair.right);
        edges.push(pair.clone());
    }

    (connected, edges)
}
