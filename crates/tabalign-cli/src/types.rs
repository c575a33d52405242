use std::path::PathBuf;

use polars::prelude::DataFrame;
use tabalign_map::MatchReport;
use tabalign_model::Plan;

/// What a command produced, for printing.
#[derive(Debug)]
pub struct RunSummary {
    pub schema: Vec<String>,
    pub report: MatchReport,
    pub plan: Plan,
    pub outcome: Option<ResultSummary>,
}

#[derive(Debug)]
pub struct ResultSummary {
    pub rows: usize,
    pub preview: DataFrame,
    pub output: Option<PathBuf>,
}
