//! Column-name scoring and schema matching.
//!
//! - [`EmbeddingSpace`] / [`PhraseScorer`]: phrase embeddings and cosine similarity
//! - [`FuzzyScorer`]: Jaro-Winkler fallback without a vocabulary
//! - [`ProvidedMatchScorer`]: externally decided matches
//! - [`SchemaMatcher`]: assigns each schema column to one source column

pub mod embedding;
pub mod engine;
pub mod error;
pub mod fuzzy;
pub mod provided;
pub mod score;

pub use embedding::EmbeddingSpace;
pub use engine::{MatchReport, SchemaMatcher};
pub use error::{EmbeddingError, ProvidedMatchError};
pub use fuzzy::FuzzyScorer;
pub use provided::{ProvidedMatch, ProvidedMatchScorer};
pub use score::{ColumnScorer, PhraseScorer, RankedColumn, cosine_similarity, phrase_tokens};
