use anyhow::{Context, Result};
use tabalign_cli::options::{OptionOverrides, build_scorer, parse_schema, resolve_options};
use tabalign_ingest::expand_sources;
use tabalign_join::Alignment;
use tracing::{info, info_span};

use crate::cli::{AlignArgs, SourceArgs};
use crate::types::{ResultSummary, RunSummary};

pub fn run_plan(args: &SourceArgs) -> Result<RunSummary> {
    let _span = info_span!("plan_command").entered();
    let alignment = prepare(args, &args.overrides())?;
    Ok(summarize(&alignment, None))
}

pub fn run_align(args: &AlignArgs) -> Result<RunSummary> {
    let _span = info_span!("align_command").entered();
    let mut alignment = prepare(&args.input, &args.overrides())?;

    let df = alignment.result().context("align sources")?;
    let rows = df.height();
    let preview = df.head(Some(args.preview));
    info!(rows, columns = df.width(), "result ready");

    if let Some(path) = &args.output {
        alignment
            .persist(path)
            .with_context(|| format!("write {}", path.display()))?;
        info!(path = %path.display(), "result written");
    }

    let outcome = ResultSummary {
        rows,
        preview,
        output: args.output.clone(),
    };
    Ok(summarize(&alignment, Some(outcome)))
}

fn prepare(args: &SourceArgs, overrides: &OptionOverrides) -> Result<Alignment> {
    let schema = parse_schema(&args.schema)?;
    let options = resolve_options(args.config.as_deref(), overrides)?;
    let scorer = build_scorer(&args.scorer.choice())?;
    let sources = expand_sources(&args.sources).context("expand sources")?;
    Alignment::prepare(&schema, &sources, scorer.as_ref(), &options).context("plan alignment")
}

fn summarize(alignment: &Alignment, outcome: Option<ResultSummary>) -> RunSummary {
    RunSummary {
        schema: alignment.schema().to_vec(),
        report: alignment.report().clone(),
        plan: alignment.plan().clone(),
        outcome,
    }
}
