//! # paperwise-recommend
//!
//! Weekly paper recommendation engine.
//!
//! This crate provides:
//! - Profile construction from saved papers, collections or subject area
//! - Four category generators sharing an exclusion set, each broadening its
//!   query until the section is filled
//! - Cross-category deduplication with backfill of short sections
//! - Optional LLM ranking and semantic annotation
//! - A TTL cache keyed by user and project
//!
//! ## Example
//!
//! ```ignore
//! use paperwise_recommend::RecommendationOrchestrator;
//!
//! let orchestrator = RecommendationOrchestrator::builder(signals, source)
//!     .with_config(RecommendationConfig::load()?)
//!     .build()?;
//!
//! let set = orchestrator
//!     .get_weekly_recommendations(user_id, None, false)
//!     .await?;
//! for paper in set.papers(RecommendationCategory::PapersForYou) {
//!     println!("{} ({})", paper.title, paper.reason);
//! }
//! ```

pub mod cache;
pub mod config;
pub mod deduplication;
pub mod enrichment;
pub mod exclusion;
pub mod generators;
pub mod ladder;
pub mod orchestrator;
pub mod profile;
pub mod scoring;

#[cfg(test)]
mod test_support;

// Re-export core types
pub use paperwise_core::*;

pub use cache::{CacheStats, InMemoryStore, RecommendationCache};
pub use config::{ConfigError, LadderConfig, RecommendationConfig};
pub use deduplication::{deduplicate_sections, DeduplicationConfig, DeduplicationStats, Deduplicator};
pub use enrichment::{Enricher, RankingStrategy};
pub use exclusion::ExclusionSet;
pub use generators::{default_generators, CategoryGenerator, GenerationContext, Scored};
pub use ladder::{climb, LadderOutcome, Rung};
pub use orchestrator::{OrchestratorBuilder, RecommendationOrchestrator};
pub use profile::ProfileBuilder;
