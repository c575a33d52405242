//! Join planning and execution.
//!
//! Given the [`FileAssignment`](tabalign_model::FileAssignment) produced by
//! schema matching, this crate decides how the supplying tables connect
//! ([`JoinPlanner`]), joins them with cardinality-checked keys
//! ([`MultiTableJoin`]) or projects a lone table ([`SingleTableFilter`]), and
//! writes the result ([`write_csv`]). [`Alignment`] ties the stages together.
//!
//! # Example
//!
//! ```ignore
//! use tabalign_join::align;
//! use tabalign_map::FuzzyScorer;
//! use tabalign_model::AlignOptions;
//!
//! let schema = vec!["rain".to_string(), "city".to_string()];
//! let mut alignment = align(&schema, &["weather.csv", "states.csv"], &FuzzyScorer, &AlignOptions::default())?;
//! alignment.persist(Path::new("out.csv"))?;
//! ```

pub mod cardinality;
pub mod executor;
pub mod keys;
pub mod output;
pub mod pipeline;
pub mod planner;
pub mod project;
pub mod single;

pub use cardinality::{JoinKey, KeyCast, key_cast, probe_cardinality};
pub use executor::MultiTableJoin;
pub use keys::key_candidates;
pub use output::write_csv;
pub use pipeline::{Alignment, align};
pub use planner::JoinPlanner;
pub use single::SingleTableFilter;
