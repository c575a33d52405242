//! Data model shared by the table alignment crates.

pub mod error;
pub mod matching;
pub mod options;
pub mod plan;

pub use error::{AlignError, PipelineError, Result, Stage};
pub use matching::{
    ColumnAssignment, ColumnMatch, FileAssignment, MatchedSource, TableHeaders, TableId,
};
pub use options::{AlignOptions, KeyCandidatePolicy};
pub use plan::{JoinEdge, JoinPlan, KeyCandidate, Plan};
