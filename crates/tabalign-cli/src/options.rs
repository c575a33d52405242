//! Resolution of run options and scorer from command-line inputs.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use tabalign_map::{ColumnScorer, EmbeddingSpace, FuzzyScorer, PhraseScorer, ProvidedMatchScorer};
use tabalign_model::AlignOptions;
use tracing::info;

/// Flag values that override fields of the configuration file.
#[derive(Debug, Clone, Default)]
pub struct OptionOverrides {
    pub min_score: Option<f64>,
    pub key_threshold: Option<f64>,
    pub max_keys: Option<usize>,
    pub limit: Option<usize>,
    pub no_dedupe: bool,
}

/// Loads options from an optional JSON file, then applies flag overrides.
pub fn resolve_options(config: Option<&Path>, overrides: &OptionOverrides) -> Result<AlignOptions> {
    let mut options = match config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("read config {}", path.display()))?;
            serde_json::from_str::<AlignOptions>(&text)
                .with_context(|| format!("parse config {}", path.display()))?
        }
        None => AlignOptions::default(),
    };
    if let Some(score) = overrides.min_score {
        options = options.with_min_match_score(Some(score));
    }
    if let Some(threshold) = overrides.key_threshold {
        options = options.with_key_threshold(threshold);
    }
    if let Some(keys) = overrides.max_keys {
        options = options.with_max_join_keys(keys);
    }
    if overrides.limit.is_some() {
        options = options.with_limit_rows(overrides.limit);
    }
    if overrides.no_dedupe {
        options.dedupe_single_table = false;
    }
    options.max_join_keys = options.max_join_keys.max(1);
    if !(-1.0..=1.0).contains(&options.key_candidates.exact_threshold) {
        bail!(
            "key threshold {} is outside [-1, 1]",
            options.key_candidates.exact_threshold
        );
    }
    Ok(options)
}

/// Where column similarity scores come from.
#[derive(Debug, Clone, PartialEq)]
pub enum ScorerChoice {
    /// Phrase embeddings read from a `token v1 ... vN` file.
    Embeddings(PathBuf),
    /// Externally decided matches read from a JSON file.
    Provided(PathBuf),
    /// Jaro-Winkler over normalized names.
    Fuzzy,
}

pub fn build_scorer(choice: &ScorerChoice) -> Result<Box<dyn ColumnScorer>> {
    let scorer: Box<dyn ColumnScorer> = match choice {
        ScorerChoice::Embeddings(path) => {
            let space = EmbeddingSpace::load(path)
                .with_context(|| format!("load embeddings {}", path.display()))?;
            Box::new(PhraseScorer::new(space))
        }
        ScorerChoice::Provided(path) => {
            let scorer = ProvidedMatchScorer::load(path)
                .with_context(|| format!("load matches {}", path.display()))?;
            info!(pairs = scorer.len(), "provided matches loaded");
            Box::new(scorer)
        }
        ScorerChoice::Fuzzy => Box::new(FuzzyScorer),
    };
    Ok(scorer)
}

/// Splits, trims and validates schema column names.
pub fn parse_schema(values: &[String]) -> Result<Vec<String>> {
    let schema: Vec<String> = values
        .iter()
        .flat_map(|value| value.split(','))
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect();
    if schema.is_empty() {
        bail!("schema must name at least one column");
    }
    if let Some(duplicate) = schema
        .iter()
        .enumerate()
        .find(|(idx, name)| schema[..*idx].contains(name))
        .map(|(_, name)| name)
    {
        bail!("schema column '{duplicate}' is listed more than once");
    }
    Ok(schema)
}
