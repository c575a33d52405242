//! Schema-to-source matching records.
//!
//! A [`ColumnMatch`] links one schema column to at most one source column. The
//! inverse view, grouped by table, is the [`FileAssignment`].

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{AlignError, Result};

/// Index of a source table within a run, assigned in input order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TableId(pub usize);

impl TableId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for TableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Column headers of one source table, as seen by the matcher and planner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableHeaders {
    pub id: TableId,
    /// Short, unique table name used in messages and collision renames.
    pub name: String,
    pub columns: Vec<String>,
}

/// The source column chosen for a schema column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchedSource {
    pub table: TableId,
    pub column: String,
    /// Similarity in [-1, 1] as reported by the scorer.
    pub score: f64,
}

/// Match of one schema column. `source` is `None` when no table offered a
/// scoreable candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnMatch {
    pub schema_column: String,
    pub source: Option<MatchedSource>,
}

impl ColumnMatch {
    pub fn unmatched(schema_column: impl Into<String>) -> Self {
        Self {
            schema_column: schema_column.into(),
            source: None,
        }
    }

    pub fn is_matched(&self) -> bool {
        self.source.is_some()
    }
}

/// A source column feeding a schema column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnAssignment {
    pub source_column: String,
    pub schema_column: String,
}

/// Source columns each table must supply, grouped by table in input order.
///
/// One source column may feed several schema columns.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileAssignment {
    tables: BTreeMap<TableId, Vec<ColumnAssignment>>,
}

impl FileAssignment {
    /// Inverts a match list. Unmatched schema columns contribute nothing.
    ///
    /// Fails with [`AlignError::AmbiguousProjection`] when the same schema
    /// column name is matched more than once.
    pub fn from_matches(matches: &[ColumnMatch]) -> Result<Self> {
        let mut sources_by_schema: BTreeMap<&str, Vec<String>> = BTreeMap::new();
        let mut tables: BTreeMap<TableId, Vec<ColumnAssignment>> = BTreeMap::new();
        for column_match in matches {
            let Some(source) = &column_match.source else {
                continue;
            };
            sources_by_schema
                .entry(column_match.schema_column.as_str())
                .or_default()
                .push(format!("{}:{}", source.table, source.column));
            tables
                .entry(source.table)
                .or_default()
                .push(ColumnAssignment {
                    source_column: source.column.clone(),
                    schema_column: column_match.schema_column.clone(),
                });
        }
        if let Some((schema_column, sources)) =
            sources_by_schema.into_iter().find(|(_, s)| s.len() > 1)
        {
            return Err(AlignError::AmbiguousProjection {
                schema_column: schema_column.to_string(),
                sources,
            });
        }
        Ok(Self { tables })
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    pub fn contains(&self, table: TableId) -> bool {
        self.tables.contains_key(&table)
    }

    /// Tables that supply at least one schema column, in input order.
    pub fn tables(&self) -> impl Iterator<Item = TableId> + '_ {
        self.tables.keys().copied()
    }

    /// The only assigned table, when exactly one table supplies every column.
    pub fn single_table(&self) -> Option<TableId> {
        if self.tables.len() == 1 {
            self.tables.keys().next().copied()
        } else {
            None
        }
    }

    pub fn columns_for(&self, table: TableId) -> &[ColumnAssignment] {
        self.tables.get(&table).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn iter(&self) -> impl Iterator<Item = (TableId, &[ColumnAssignment])> {
        self.tables.iter().map(|(id, cols)| (*id, cols.as_slice()))
    }

    /// Source column to schema columns for one table.
    pub fn projection_for(&self, table: TableId) -> BTreeMap<String, Vec<String>> {
        let mut projection: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for assignment in self.columns_for(table) {
            projection
                .entry(assignment.source_column.clone())
                .or_default()
                .push(assignment.schema_column.clone());
        }
        projection
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matched(schema: &str, table: usize, column: &str, score: f64) -> ColumnMatch {
        ColumnMatch {
            schema_column: schema.to_string(),
            source: Some(MatchedSource {
                table: TableId(table),
                column: column.to_string(),
                score,
            }),
        }
    }

    #[test]
    fn groups_by_table_and_skips_unmatched() {
        let matches = vec![
            matched("rain", 1, "precipitation", 0.8),
            matched("city", 0, "capital", 0.7),
            ColumnMatch::unmatched("altitude"),
            matched("town", 0, "capital", 0.6),
        ];
        let assignment = FileAssignment::from_matches(&matches).unwrap();

        assert_eq!(assignment.len(), 2);
        assert_eq!(
            assignment.tables().collect::<Vec<_>>(),
            vec![TableId(0), TableId(1)]
        );
        let projection = assignment.projection_for(TableId(0));
        assert_eq!(
            projection.get("capital"),
            Some(&vec!["city".to_string(), "town".to_string()])
        );
        assert_eq!(assignment.columns_for(TableId(0)).len(), 2);
        assert!(assignment.single_table().is_none());
    }

    #[test]
    fn duplicate_schema_column_is_ambiguous() {
        let matches = vec![matched("id", 0, "id", 1.0), matched("id", 1, "key", 0.9)];
        let err = FileAssignment::from_matches(&matches).unwrap_err();
        assert!(matches!(
            err,
            AlignError::AmbiguousProjection { ref schema_column, .. } if schema_column == "id"
        ));
    }

    #[test]
    fn single_table_detected() {
        let matches = vec![matched("x", 2, "x", 1.0), matched("y", 2, "y", 1.0)];
        let assignment = FileAssignment::from_matches(&matches).unwrap();
        assert_eq!(assignment.single_table(), Some(TableId(2)));
    }
}
