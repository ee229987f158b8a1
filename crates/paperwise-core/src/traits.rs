//! Core traits for paperwise abstractions.
//!
//! These traits define the interfaces to the external collaborators of the
//! recommendation engine, enabling pluggable backends and testability.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::models::*;

// =============================================================================
// CANDIDATE SOURCE
// =============================================================================

/// Provider of candidate papers for a query.
///
/// An empty result is `Ok(vec![])`, never an error. Implementations validate
/// upstream records before returning them.
#[async_trait]
pub trait CandidateSource: Send + Sync {
    /// Short identifier used in logs (e.g. "pubmed", "articles").
    fn name(&self) -> &str;

    /// Search for papers matching the query.
    async fn search(&self, query: &CandidateQuery) -> Result<Vec<SourcePaper>>;
}

// =============================================================================
// PROFILE SIGNALS
// =============================================================================

/// Read-only access to the signals a profile is derived from.
#[async_trait]
pub trait ProfileSignalStore: Send + Sync {
    /// Papers the user saved, restricted to a project when given.
    async fn saved_items(&self, user_id: Uuid, project_id: Option<Uuid>)
        -> Result<Vec<SavedItem>>;

    /// Collections owned by the user, restricted to a project when given.
    async fn collections(
        &self,
        user_id: Uuid,
        project_id: Option<Uuid>,
    ) -> Result<Vec<CollectionSummary>>;

    /// The user's registered subject area, if any.
    async fn subject_area(&self, user_id: Uuid) -> Result<Option<String>>;
}

// =============================================================================
// OPTIONAL COLLABORATORS
// =============================================================================

/// Semantic annotation of a single paper.
#[async_trait]
pub trait SemanticAnnotator: Send + Sync {
    async fn annotate(&self, paper: &CandidatePaper) -> Result<SemanticAnalysis>;
}

/// Re-ranks and explains the papers of one category.
#[async_trait]
pub trait CandidateRanker: Send + Sync {
    /// Return adjusted scores and reasons. Ids not in `papers` are ignored.
    async fn rank(
        &self,
        profile: &UserProfile,
        category: RecommendationCategory,
        papers: &[CandidatePaper],
    ) -> Result<Vec<RankedPaper>>;
}

// =============================================================================
// CACHE BACKEND
// =============================================================================

/// Key-value store holding cached recommendation sets.
///
/// `put` always replaces the whole entry. Expiry is checked by the caller,
/// a backend may additionally expire entries on its own.
#[async_trait]
pub trait RecommendationStore: Send + Sync {
    async fn get(&self, key: &CacheKey) -> Result<Option<CacheEntry>>;

    async fn put(&self, entry: CacheEntry) -> Result<()>;

    /// Remove every entry.
    async fn clear(&self) -> Result<()>;
}
