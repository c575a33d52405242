use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Failures of matching, planning and join execution.
///
/// Every variant names the schema column, table or table pair it concerns so
/// callers can report the reason without parsing the message.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AlignError {
    /// A source table could not be read or is malformed.
    #[error("failed to read source table {location}: {message}")]
    Parse { location: PathBuf, message: String },

    /// A schema column has no scoreable candidate in any source table.
    #[error("no source column matches schema column '{schema_column}'")]
    NoMatch { schema_column: String },

    /// The assigned tables cannot be connected through candidate join keys.
    #[error("join graph is disconnected; orphaned tables: {}", orphaned.join(", "))]
    DisconnectedJoinGraph { orphaned: Vec<String> },

    /// No key candidate between two tables produces a non-empty inner join.
    #[error("no viable join key between '{left}' and '{right}'")]
    UnviableKey { left: String, right: String },

    /// A schema column would be fed by more than one source column.
    #[error(
        "schema column '{schema_column}' is supplied by more than one source: {}",
        sources.join(", ")
    )]
    AmbiguousProjection {
        schema_column: String,
        sources: Vec<String>,
    },

    /// A table was requested after it had been evicted from the cache.
    #[error("table '{table}' was already consumed and evicted")]
    TableEvicted { table: String },

    /// The target schema lists no columns.
    #[error("schema has no columns")]
    EmptySchema,

    /// The result could not be written to its destination.
    #[error("failed to write result to {path}: {message}")]
    Persist { path: PathBuf, message: String },

    /// A DataFrame operation failed.
    #[error("DataFrame operation failed: {message}")]
    Frame { message: String },
}

impl AlignError {
    pub fn parse(location: impl Into<PathBuf>, message: impl fmt::Display) -> Self {
        Self::Parse {
            location: location.into(),
            message: message.to_string(),
        }
    }

    pub fn frame(message: impl fmt::Display) -> Self {
        Self::Frame {
            message: message.to_string(),
        }
    }
}

/// Pipeline stage a failure originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Reading headers, matching and join planning. Nothing has been joined yet.
    Planning,
    /// Loading data, joining, projecting and persisting.
    Execution,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Planning => f.write_str("planning"),
            Self::Execution => f.write_str("execution"),
        }
    }
}

/// Outcome of a failed alignment run, tagged with the failing stage.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PipelineError {
    #[error("planning failed: {0}")]
    Planning(#[source] AlignError),

    #[error("execution failed: {0}")]
    Execution(#[source] AlignError),
}

impl PipelineError {
    pub fn stage(&self) -> Stage {
        match self {
            Self::Planning(_) => Stage::Planning,
            Self::Execution(_) => Stage::Execution,
        }
    }

    /// The underlying failure reason.
    pub fn reason(&self) -> &AlignError {
        match self {
            Self::Planning(error) | Self::Execution(error) => error,
        }
    }
}

pub type Result<T> = std::result::Result<T, AlignError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disconnected_lists_orphans() {
        let err = AlignError::DisconnectedJoinGraph {
            orphaned: vec!["prices".to_string(), "regions".to_string()],
        };
        insta::assert_snapshot!(
            err.to_string(),
            @"join graph is disconnected; orphaned tables: prices, regions"
        );
    }

    #[test]
    fn pipeline_error_reports_stage() {
        let err = PipelineError::Execution(AlignError::UnviableKey {
            left: "weather".to_string(),
            right: "states".to_string(),
        });
        assert_eq!(err.stage(), Stage::Execution);
        assert!(matches!(err.reason(), AlignError::UnviableKey { .. }));
        insta::assert_snapshot!(
            err.to_string(),
            @"execution failed: no viable join key between 'weather' and 'states'"
        );
    }

    #[test]
    fn parse_helper_keeps_location() {
        let err = AlignError::parse("/data/missing.csv", "file not found");
        assert_eq!(
            err.to_string(),
            "failed to read source table /data/missing.csv: file not found"
        );
    }
}
