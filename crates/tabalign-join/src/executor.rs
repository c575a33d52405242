//! Multi-table join execution.
//!
//! Tables are joined breadth-first from the first planned table. Before each
//! merge, column names present on both sides are renamed so no values are
//! overwritten, and the join keys are chosen by probing how many rows each
//! candidate actually matches.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};

use polars::prelude::*;
use tabalign_ingest::TableStore;
use tabalign_model::{
    AlignError, AlignOptions, FileAssignment, JoinPlan, KeyCandidate, Result, TableId,
};
use tracing::{debug, info, info_span};

use crate::cardinality::{JoinKey, inner_join, key_cast, probe_cardinality};
use crate::project::project;

/// Origin of a column in the accumulated frame.
type ColumnOrigin = (TableId, String);

#[derive(Debug, Clone)]
struct ProbedKey {
    key: JoinKey,
    score: f64,
    cardinality: usize,
}

/// Executes a [`JoinPlan`] and projects the result onto the schema.
///
/// The outcome is computed on the first call to [`MultiTableJoin::result`] and
/// cached; later calls return the cached frame or the same error.
#[derive(Debug)]
pub struct MultiTableJoin {
    plan: JoinPlan,
    assignment: FileAssignment,
    schema: Vec<String>,
    options: AlignOptions,
    /// Current column name of every source column merged so far.
    current: HashMap<ColumnOrigin, String>,
    result: Option<Result<DataFrame>>,
}

impl MultiTableJoin {
    pub fn new(
        plan: JoinPlan,
        assignment: FileAssignment,
        schema: Vec<String>,
        options: AlignOptions,
    ) -> Self {
        Self {
            plan,
            assignment,
            schema,
            options,
            current: HashMap::new(),
            result: None,
        }
    }

    /// The projected, memoized result.
    ///
    /// On failure the cached table frames are released and the error is
    /// memoized in place of a result.
    pub fn result(&mut self, store: &mut TableStore) -> Result<&DataFrame> {
        if self.result.is_none() {
            let outcome = self
                .join_all(store)
                .and_then(|joined| self.project(&joined));
            if outcome.is_err() {
                self.current.clear();
                store.clear();
            }
            self.result = Some(outcome);
        }
        match &self.result {
            Some(outcome) => outcome.as_ref().map_err(AlignError::clone),
            None => Err(AlignError::frame("join result missing after execution")),
        }
    }

    /// Joins every planned table and returns the frame before projection.
    pub fn join_all(&mut self, store: &mut TableStore) -> Result<DataFrame> {
        let _span = info_span!("execute", tables = self.plan.table_count()).entered();
        self.current.clear();

        let adjacency = self.plan.adjacency();
        let mut pending: BTreeMap<TableId, usize> = adjacency
            .iter()
            .map(|(table, edges)| (*table, edges.len()))
            .collect();
        let mut consumed = vec![false; self.plan.edges().len()];

        let Some(root) = self.plan.tables().next() else {
            return Err(AlignError::EmptySchema);
        };
        let mut acc = store.load(root)?;
        self.register(root, &acc, &HashMap::new());

        let mut visited = BTreeSet::from([root]);
        let mut queue = VecDeque::from([root]);
        while let Some(table) = queue.pop_front() {
            let edge_ids = adjacency.get(&table).cloned().unwrap_or_default();
            for index in edge_ids {
                let edge = &self.plan.edges()[index];
                let Some(next) = edge.other(table) else {
                    continue;
                };
                if visited.contains(&next) {
                    continue;
                }
                let candidates = edge.candidates_from(table);
                acc = self.merge(store, acc, table, next, &candidates)?;
                visited.insert(next);
                queue.push_back(next);

                consumed[index] = true;
                for endpoint in [table, next] {
                    if let Some(count) = pending.get_mut(&endpoint) {
                        *count = count.saturating_sub(1);
                        if *count == 0 {
                            store.evict(endpoint);
                        }
                    }
                }
            }
        }

        if visited.len() != self.plan.table_count() {
            let orphaned = self
                .plan
                .tables()
                .filter(|t| !visited.contains(t))
                .map(|t| self.plan.name(t).to_string())
                .collect();
            return Err(AlignError::DisconnectedJoinGraph { orphaned });
        }
        debug!(
            unused_edges = consumed.iter().filter(|c| !**c).count(),
            "traversal finished"
        );
        info!(rows = acc.height(), columns = acc.width(), "tables joined");
        Ok(acc)
    }

    /// Joins table `next` into the accumulated frame through table `from`.
    fn merge(
        &mut self,
        store: &mut TableStore,
        mut acc: DataFrame,
        from: TableId,
        next: TableId,
        candidates: &[KeyCandidate],
    ) -> Result<DataFrame> {
        let left_name = self.plan.name(from).to_string();
        let right_name = self.plan.name(next).to_string();
        let _span = info_span!("join", left = %left_name, right = %right_name).entered();

        let mut incoming = store.load(next)?;
        let incoming_renames = self.resolve_collisions(&mut acc, &mut incoming, next)?;

        let mut probed = Vec::new();
        for candidate in candidates {
            let Some(left) = self
                .current
                .get(&(from, candidate.left_column.clone()))
                .cloned()
            else {
                continue;
            };
            let right = incoming_renames
                .get(&candidate.right_column)
                .cloned()
                .unwrap_or_else(|| candidate.right_column.clone());
            let (Ok(left_col), Ok(right_col)) = (acc.column(&left), incoming.column(&right))
            else {
                continue;
            };
            let Some(cast) = key_cast(left_col.dtype(), right_col.dtype()) else {
                debug!(
                    left = %left,
                    right = %right,
                    left_dtype = %left_col.dtype(),
                    right_dtype = %right_col.dtype(),
                    "key candidate skipped, incompatible types"
                );
                continue;
            };
            let key = JoinKey { left, right, cast };
            let cardinality =
                probe_cardinality(&acc, &incoming, &key).map_err(AlignError::frame)?;
            debug!(
                left = %key.left,
                right = %key.right,
                score = candidate.score,
                cardinality,
                "key candidate probed"
            );
            if cardinality > 0 {
                probed.push(ProbedKey {
                    key,
                    score: candidate.score,
                    cardinality,
                });
            }
        }

        let keys = choose_keys(probed, self.options.max_join_keys);
        if keys.is_empty() {
            return Err(AlignError::UnviableKey {
                left: left_name,
                right: right_name,
            });
        }

        self.register(next, &incoming, &incoming_renames);
        let joined = inner_join(acc, incoming, &keys).map_err(AlignError::frame)?;
        info!(
            keys = ?keys.iter().map(|k| format!("{}={}", k.left, k.right)).collect::<Vec<_>>(),
            rows = joined.height(),
            "tables merged"
        );
        Ok(joined)
    }

    /// Renames columns present in both frames to `<table>_<column>`.
    ///
    /// Returns the renames applied to `incoming`, keyed by original name.
    fn resolve_collisions(
        &mut self,
        acc: &mut DataFrame,
        incoming: &mut DataFrame,
        next: TableId,
    ) -> Result<HashMap<String, String>> {
        let acc_names: Vec<String> = acc
            .get_column_names_str()
            .into_iter()
            .map(str::to_string)
            .collect();
        let incoming_names: Vec<String> = incoming
            .get_column_names_str()
            .into_iter()
            .map(str::to_string)
            .collect();
        let mut taken: HashSet<String> = acc_names
            .iter()
            .chain(&incoming_names)
            .cloned()
            .collect();

        let acc_set: HashSet<&str> = acc_names.iter().map(String::as_str).collect();
        let mut incoming_renames = HashMap::new();
        for column in incoming_names.iter().filter(|c| acc_set.contains(c.as_str())) {
            let new_incoming = unique_name(&format!("{}_{column}", self.plan.name(next)), &taken);
            taken.insert(new_incoming.clone());
            incoming
                .rename(column, new_incoming.as_str().into())
                .map_err(AlignError::frame)?;
            debug!(column = %column, renamed = %new_incoming, "incoming column renamed");
            incoming_renames.insert(column.clone(), new_incoming);

            let origin = self
                .current
                .iter()
                .find(|(_, name)| *name == column)
                .map(|(origin, _)| origin.clone());
            let Some((owner, original)) = origin else {
                continue;
            };
            if original != *column {
                // Already carries a collision name; keep it.
                continue;
            }
            let new_acc = unique_name(&format!("{}_{column}", self.plan.name(owner)), &taken);
            taken.insert(new_acc.clone());
            acc.rename(column, new_acc.as_str().into())
                .map_err(AlignError::frame)?;
            debug!(column = %column, renamed = %new_acc, "accumulated column renamed");
            self.current.insert((owner, original), new_acc);
        }
        Ok(incoming_renames)
    }

    /// Records the current names of a table's columns after merging.
    fn register(&mut self, table: TableId, frame: &DataFrame, renames: &HashMap<String, String>) {
        let renamed_back: HashMap<&str, &str> = renames
            .iter()
            .map(|(original, new)| (new.as_str(), original.as_str()))
            .collect();
        for name in frame.get_column_names_str() {
            let original = renamed_back.get(name).copied().unwrap_or(name);
            self.current
                .insert((table, original.to_string()), name.to_string());
        }
    }

    fn project(&self, joined: &DataFrame) -> Result<DataFrame> {
        let mut sources: HashMap<&str, String> = HashMap::new();
        for (table, assignments) in self.assignment.iter() {
            for assignment in assignments {
                let current = self
                    .current
                    .get(&(table, assignment.source_column.clone()))
                    .cloned()
                    .ok_or_else(|| {
                        AlignError::frame(format!(
                            "column '{}' of table '{}' missing from the joined frame",
                            assignment.source_column,
                            self.plan.name(table)
                        ))
                    })?;
                sources.insert(assignment.schema_column.as_str(), current);
            }
        }
        project(joined, &self.schema, &sources, false, self.options.limit_rows)
    }
}

/// Picks up to `max_keys` keys, best cardinality first, then best score.
///
/// A key reusing a column already chosen on either side is skipped.
fn choose_keys(mut probed: Vec<ProbedKey>, max_keys: usize) -> Vec<JoinKey> {
    probed.sort_by(|a, b| {
        b.cardinality
            .cmp(&a.cardinality)
            .then_with(|| b.score.total_cmp(&a.score))
    });
    let mut chosen: Vec<JoinKey> = Vec::new();
    for candidate in probed {
        if chosen.len() >= max_keys.max(1) {
            break;
        }
        let reused = chosen
            .iter()
            .any(|k| k.left == candidate.key.left || k.right == candidate.key.right);
        if !reused {
            chosen.push(candidate.key);
        }
    }
    chosen
}

/// `base`, or `base_<n>` for the smallest `n >= 2` not in `taken`.
fn unique_name(base: &str, taken: &HashSet<String>) -> String {
    if !taken.contains(base) {
        return base.to_string();
    }
    (2..)
        .map(|n| format!("{base}_{n}"))
        .find(|name| !taken.contains(name))
        .unwrap_or_else(|| base.to_string())
}
