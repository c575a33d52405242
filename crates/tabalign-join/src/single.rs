//! Projection of a single source table, used when no join is needed.

use std::collections::HashMap;

use polars::prelude::DataFrame;
use tabalign_ingest::TableStore;
use tabalign_model::{AlignError, AlignOptions, FileAssignment, Result, TableId};
use tracing::{info, info_span};

use crate::project::project;

/// Projects one table onto the schema, dropping duplicate rows.
///
/// The outcome, success or failure, is memoized like
/// [`crate::MultiTableJoin`]'s.
#[derive(Debug)]
pub struct SingleTableFilter {
    table: TableId,
    assignment: FileAssignment,
    schema: Vec<String>,
    options: AlignOptions,
    result: Option<Result<DataFrame>>,
}

impl SingleTableFilter {
    pub fn new(
        table: TableId,
        assignment: FileAssignment,
        schema: Vec<String>,
        options: AlignOptions,
    ) -> Self {
        Self {
            table,
            assignment,
            schema,
            options,
            result: None,
        }
    }

    pub fn result(&mut self, store: &mut TableStore) -> Result<&DataFrame> {
        if self.result.is_none() {
            let outcome = self.compute(store);
            if outcome.is_err() {
                store.clear();
            }
            self.result = Some(outcome);
        }
        match &self.result {
            Some(outcome) => outcome.as_ref().map_err(AlignError::clone),
            None => Err(AlignError::frame("projection result missing after execution")),
        }
    }

    fn compute(&self, store: &mut TableStore) -> Result<DataFrame> {
        let _span = info_span!("execute", table = %store.name(self.table)).entered();
        let frame = store.load(self.table)?;
        let projection = self.assignment.projection_for(self.table);
        let sources: HashMap<&str, String> = projection
            .iter()
            .flat_map(|(source, targets)| {
                targets
                    .iter()
                    .map(move |target| (target.as_str(), source.clone()))
            })
            .collect();
        let df = project(
            &frame,
            &self.schema,
            &sources,
            self.options.dedupe_single_table,
            self.options.limit_rows,
        )?;
        store.evict(self.table);
        info!(
            rows_in = frame.height(),
            rows_out = df.height(),
            "single table projected"
        );
        Ok(df)
    }
}
