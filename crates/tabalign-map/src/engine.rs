//! Schema-to-source column matcher.

use std::collections::BTreeMap;
use std::fmt;

use tabalign_model::{
    AlignError, AlignOptions, ColumnMatch, FileAssignment, MatchedSource, Result, TableHeaders,
    TableId,
};
use tracing::{debug, info, warn};

use crate::score::ColumnScorer;

/// Result of matching a schema against a set of tables.
#[derive(Debug, Clone)]
pub struct MatchReport {
    /// One entry per schema column, in schema order.
    pub matches: Vec<ColumnMatch>,
    /// Matched columns grouped by supplying table.
    pub assignment: FileAssignment,
    names: BTreeMap<TableId, String>,
}

impl MatchReport {
    /// Schema columns without a scoreable candidate anywhere.
    pub fn unmatched(&self) -> Vec<&str> {
        self.matches
            .iter()
            .filter(|m| !m.is_matched())
            .map(|m| m.schema_column.as_str())
            .collect()
    }

    /// Short name of a matched table, or its id when the table is unknown.
    pub fn table_name(&self, table: TableId) -> String {
        self.names
            .get(&table)
            .cloned()
            .unwrap_or_else(|| table.to_string())
    }

    pub fn matched_count(&self) -> usize {
        self.matches.iter().filter(|m| m.is_matched()).count()
    }

    /// Fails with [`AlignError::NoMatch`] naming the first unmatched column.
    pub fn require_complete(&self) -> Result<()> {
        match self.unmatched().first() {
            Some(column) => Err(AlignError::NoMatch {
                schema_column: (*column).to_string(),
            }),
            None => Ok(()),
        }
    }
}

impl fmt::Display for MatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for m in &self.matches {
            match &m.source {
                Some(source) => writeln!(
                    f,
                    "{} <- {}:{} ({:.3})",
                    m.schema_column,
                    self.table_name(source.table),
                    source.column,
                    source.score
                )?,
                None => writeln!(f, "{} <- (none)", m.schema_column)?,
            }
        }
        Ok(())
    }
}

/// Assigns every schema column to its best-scoring source column.
///
/// Each table is ranked independently; the best candidate across tables wins,
/// with ties going to the table listed first.
pub struct SchemaMatcher<'a> {
    scorer: &'a dyn ColumnScorer,
    min_score: Option<f64>,
}

impl<'a> SchemaMatcher<'a> {
    pub fn new(scorer: &'a dyn ColumnScorer, options: &AlignOptions) -> Self {
        Self {
            scorer,
            min_score: options.min_match_score,
        }
    }

    /// Best `(table, column, score)` for one schema column.
    pub fn best_source(&self, schema_column: &str, tables: &[TableHeaders]) -> Option<MatchedSource> {
        let mut best: Option<MatchedSource> = None;
        for table in tables {
            let ranked = self.scorer.rank(schema_column, &table.columns);
            let Some(top) = ranked
                .into_iter()
                .find(|c| self.min_score.is_none_or(|min| c.score >= min))
            else {
                continue;
            };
            debug!(
                schema_column,
                table = %table.name,
                column = %top.column,
                score = top.score,
                "best candidate in table"
            );
            if best.as_ref().is_none_or(|b| top.score > b.score) {
                best = Some(MatchedSource {
                    table: table.id,
                    column: top.column,
                    score: top.score,
                });
            }
        }
        best
    }

    /// Matches every schema column. Unmatched columns are kept with no source.
    pub fn match_schema(&self, schema: &[String], tables: &[TableHeaders]) -> Result<MatchReport> {
        let matches: Vec<ColumnMatch> = schema
            .iter()
            .map(|schema_column| ColumnMatch {
                schema_column: schema_column.clone(),
                source: self.best_source(schema_column, tables),
            })
            .collect();

        let names: BTreeMap<TableId, String> =
            tables.iter().map(|t| (t.id, t.name.clone())).collect();
        for m in &matches {
            match &m.source {
                Some(source) => {
                    let table = names.get(&source.table).map_or("?", String::as_str);
                    info!(
                        schema_column = %m.schema_column,
                        table,
                        column = %source.column,
                        score = source.score,
                        "schema column matched"
                    );
                }
                None => warn!(schema_column = %m.schema_column, "no candidate for schema column"),
            }
        }

        let assignment = FileAssignment::from_matches(&matches)?;
        Ok(MatchReport {
            matches,
            assignment,
            names,
        })
    }
}
