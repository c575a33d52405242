//! End-to-end alignment: read headers, match, plan, execute, persist.

use std::path::Path;

use polars::prelude::DataFrame;
use tabalign_ingest::TableStore;
use tabalign_map::{ColumnScorer, MatchReport, SchemaMatcher};
use tabalign_model::{AlignError, AlignOptions, PipelineError, Plan};
use tracing::{info, info_span};

use crate::executor::MultiTableJoin;
use crate::output::write_csv;
use crate::planner::JoinPlanner;
use crate::single::SingleTableFilter;

#[derive(Debug)]
enum Execution {
    Single(SingleTableFilter),
    Join(MultiTableJoin),
}

/// A planned alignment run.
///
/// Planning has fully succeeded once an `Alignment` exists. The result is
/// computed on first request and memoized; persisting is a separate step.
#[derive(Debug)]
pub struct Alignment {
    schema: Vec<String>,
    store: TableStore,
    report: MatchReport,
    plan: Plan,
    execution: Execution,
}

impl Alignment {
    /// Reads source headers, matches the schema and plans the joins.
    ///
    /// Every failure here is a [`PipelineError::Planning`]; no table rows have
    /// been read yet.
    pub fn prepare<P: AsRef<Path>>(
        schema: &[String],
        sources: &[P],
        scorer: &dyn ColumnScorer,
        options: &AlignOptions,
    ) -> Result<Self, PipelineError> {
        let _span = info_span!("align", schema = schema.len(), sources = sources.len()).entered();
        Self::plan_inner(schema, sources, scorer, options).map_err(PipelineError::Planning)
    }

    fn plan_inner<P: AsRef<Path>>(
        schema: &[String],
        sources: &[P],
        scorer: &dyn ColumnScorer,
        options: &AlignOptions,
    ) -> Result<Self, AlignError> {
        if schema.is_empty() {
            return Err(AlignError::EmptySchema);
        }
        let store = TableStore::open(sources)?;
        let headers = store.headers();

        let report = SchemaMatcher::new(scorer, options).match_schema(schema, &headers)?;
        report.require_complete()?;

        let plan = JoinPlanner::new(scorer, options).plan(&report.assignment, &headers)?;
        let execution = match &plan {
            Plan::Single(table) => Execution::Single(SingleTableFilter::new(
                *table,
                report.assignment.clone(),
                schema.to_vec(),
                options.clone(),
            )),
            Plan::Join(join) => Execution::Join(MultiTableJoin::new(
                join.clone(),
                report.assignment.clone(),
                schema.to_vec(),
                options.clone(),
            )),
        };
        info!(
            tables = report.assignment.len(),
            join = matches!(plan, Plan::Join(_)),
            "alignment planned"
        );

        Ok(Self {
            schema: schema.to_vec(),
            store,
            report,
            plan,
            execution,
        })
    }

    pub fn schema(&self) -> &[String] {
        &self.schema
    }

    pub fn report(&self) -> &MatchReport {
        &self.report
    }

    pub fn plan(&self) -> &Plan {
        &self.plan
    }

    pub fn store(&self) -> &TableStore {
        &self.store
    }

    /// The schema-conformant result, computed once.
    pub fn result(&mut self) -> Result<&DataFrame, PipelineError> {
        let _span = info_span!("result").entered();
        let outcome = match &mut self.execution {
            Execution::Single(filter) => filter.result(&mut self.store),
            Execution::Join(join) => join.result(&mut self.store),
        };
        outcome.map_err(PipelineError::Execution)
    }

    /// Writes the result to `path`, computing it first if needed.
    ///
    /// Re-running overwrites `path` with identical content.
    pub fn persist(&mut self, path: &Path) -> Result<(), PipelineError> {
        let df = self.result()?;
        write_csv(df, path).map_err(PipelineError::Execution)
    }
}

/// Plans and executes an alignment in one call.
pub fn align<P: AsRef<Path>>(
    schema: &[String],
    sources: &[P],
    scorer: &dyn ColumnScorer,
    options: &AlignOptions,
) -> Result<Alignment, PipelineError> {
    let mut alignment = Alignment::prepare(schema, sources, scorer, options)?;
    alignment.result()?;
    Ok(alignment)
}
