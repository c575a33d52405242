//! Join planning records.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::matching::TableId;

/// A candidate key pair between two tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyCandidate {
    /// Column of [`JoinEdge::left`].
    pub left_column: String,
    /// Column of [`JoinEdge::right`].
    pub right_column: String,
    pub score: f64,
}

/// Two tables to be joined and their key candidates, best first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JoinEdge {
    pub left: TableId,
    pub right: TableId,
    pub candidates: Vec<KeyCandidate>,
}

impl JoinEdge {
    /// The table on the other end, if `table` is an endpoint.
    pub fn other(&self, table: TableId) -> Option<TableId> {
        if self.left == table {
            Some(self.right)
        } else if self.right == table {
            Some(self.left)
        } else {
            None
        }
    }

    /// Key candidates oriented so that `left_column` belongs to `from`.
    pub fn candidates_from(&self, from: TableId) -> Vec<KeyCandidate> {
        if from == self.left {
            self.candidates.clone()
        } else {
            self.candidates
                .iter()
                .map(|c| KeyCandidate {
                    left_column: c.right_column.clone(),
                    right_column: c.left_column.clone(),
                    score: c.score,
                })
                .collect()
        }
    }
}

/// Edges connecting every table that supplies a schema column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JoinPlan {
    names: BTreeMap<TableId, String>,
    edges: Vec<JoinEdge>,
}

impl JoinPlan {
    pub fn new(names: BTreeMap<TableId, String>, edges: Vec<JoinEdge>) -> Self {
        Self { names, edges }
    }

    /// Tables covered by the plan, in input order.
    pub fn tables(&self) -> impl Iterator<Item = TableId> + '_ {
        self.names.keys().copied()
    }

    pub fn table_count(&self) -> usize {
        self.names.len()
    }

    pub fn edges(&self) -> &[JoinEdge] {
        &self.edges
    }

    pub fn name(&self, table: TableId) -> &str {
        self.names.get(&table).map(String::as_str).unwrap_or("?")
    }

    /// Indices into [`Self::edges`] grouped by endpoint.
    pub fn adjacency(&self) -> BTreeMap<TableId, Vec<usize>> {
        let mut adjacency: BTreeMap<TableId, Vec<usize>> =
            self.names.keys().map(|id| (*id, Vec::new())).collect();
        for (index, edge) in self.edges.iter().enumerate() {
            adjacency.entry(edge.left).or_default().push(index);
            adjacency.entry(edge.right).or_default().push(index);
        }
        adjacency
    }
}

impl fmt::Display for JoinPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for edge in &self.edges {
            write!(f, "{} <-> {}:", self.name(edge.left), self.name(edge.right))?;
            for candidate in &edge.candidates {
                write!(
                    f,
                    " ({} = {}, {:.3})",
                    candidate.left_column, candidate.right_column, candidate.score
                )?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// How the result will be produced.
#[derive(Debug, Clone, PartialEq)]
pub enum Plan {
    /// One table supplies every schema column; no join is needed.
    Single(TableId),
    Join(JoinPlan),
}
