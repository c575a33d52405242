//! CLI argument definitions for `tabalign`.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;
use tabalign_cli::options::{OptionOverrides, ScorerChoice};

#[derive(Parser)]
#[command(
    name = "tabalign",
    version,
    about = "Align CSV sources to a target schema by column-name similarity",
    long_about = "Align one or more CSV sources to an ordered list of target columns.\n\n\
                  Each target column is matched to the most similar source column, the\n\
                  supplying tables are joined on keys checked against the data, and the\n\
                  result is projected onto the target columns in order."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Match, plan, join and project the sources onto the schema.
    Align(AlignArgs),

    /// Match and plan only; no table rows are read.
    Plan(SourceArgs),
}

/// Inputs shared by every subcommand.
#[derive(Args)]
pub struct SourceArgs {
    /// Target columns in output order, comma separated.
    #[arg(long = "schema", value_name = "COLUMNS", required = true)]
    pub schema: Vec<String>,

    #[command(flatten)]
    pub scorer: ScorerArgs,

    /// JSON file with alignment options.
    #[arg(long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Ignore candidate columns scoring below this.
    #[arg(long = "min-score", value_name = "SCORE")]
    pub min_score: Option<f64>,

    /// Key candidates at or above this score are all kept.
    #[arg(long = "key-threshold", value_name = "SCORE")]
    pub key_threshold: Option<f64>,

    /// Maximum number of columns combined into one join key.
    #[arg(long = "max-keys", value_name = "N")]
    pub max_keys: Option<usize>,

    /// Source CSV files or directories of CSV files.
    #[arg(value_name = "SOURCES", required = true)]
    pub sources: Vec<PathBuf>,
}

/// Similarity source; fuzzy name matching when none is given.
#[derive(Args)]
#[group(multiple = false)]
pub struct ScorerArgs {
    /// Word embedding file (`token v1 ... vN` per line).
    #[arg(long = "embeddings", value_name = "FILE")]
    pub embeddings: Option<PathBuf>,

    /// JSON array of `{schema_column, source_column, confidence}` matches.
    #[arg(long = "matches", value_name = "FILE")]
    pub matches: Option<PathBuf>,

    /// Jaro-Winkler similarity of normalized names.
    #[arg(long = "fuzzy")]
    pub fuzzy: bool,
}

impl ScorerArgs {
    pub fn choice(&self) -> ScorerChoice {
        match (&self.embeddings, &self.matches) {
            (Some(path), _) => ScorerChoice::Embeddings(path.clone()),
            (None, Some(path)) => ScorerChoice::Provided(path.clone()),
            (None, None) => ScorerChoice::Fuzzy,
        }
    }
}

#[derive(Args)]
pub struct AlignArgs {
    #[command(flatten)]
    pub input: SourceArgs,

    /// Keep at most this many result rows.
    #[arg(long = "limit", value_name = "N")]
    pub limit: Option<usize>,

    /// Keep duplicate rows when a single table supplies every column.
    #[arg(long = "no-dedupe")]
    pub no_dedupe: bool,

    /// Write the result as CSV to this file (overwritten if present).
    #[arg(long = "output", short = 'o', value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Number of result rows to print.
    #[arg(long = "preview", value_name = "N", default_value_t = 10)]
    pub preview: usize,
}

impl AlignArgs {
    pub fn overrides(&self) -> OptionOverrides {
        OptionOverrides {
            limit: self.limit,
            no_dedupe: self.no_dedupe,
            ..self.input.overrides()
        }
    }
}

impl SourceArgs {
    pub fn overrides(&self) -> OptionOverrides {
        OptionOverrides {
            min_score: self.min_score,
            key_threshold: self.key_threshold,
            max_keys: self.max_keys,
            ..OptionOverrides::default()
        }
    }
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
