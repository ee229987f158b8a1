//! # paperwise-sources
//!
//! Candidate paper sources for the recommendation engine.
//!
//! - [`PubMedSource`]: NCBI E-utilities (esearch + esummary)
//! - [`ChainedSource`]: several sources queried in order and merged
//!
//! The relational source over ingested articles lives in `paperwise-db`.

pub mod chained;
pub mod pubmed;

pub use chained::ChainedSource;
pub use pubmed::{PubMedConfig, PubMedSource};
