//! Recommendation deduplication across categories.
//!
//! Generators only claim ids nobody holds yet, but they also pass along
//! eligible papers an earlier category already claimed, and a generator can
//! emit the same paper twice. This module enforces the final invariants:
//!
//! 1. An id appears at most once within a category (first occurrence wins).
//! 2. An id appears in at most one category as a regular entry; the
//!    highest-priority category keeps it.
//! 3. A section left below the minimum size may be topped up with papers it
//!    lost in step 2, marked with `is_backfill_duplicate`.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashSet};

use chrono::Utc;
use paperwise_core::defaults::MIN_PAPERS_PER_SECTION;
use paperwise_core::{logging, CandidatePaper, RecommendationCategory, RecommendationSet, UserProfile};
use tracing::{debug, info};

/// Per-category candidate lists as produced by the generators.
pub type CategorySections = BTreeMap<RecommendationCategory, Vec<CandidatePaper>>;

/// Configuration for recommendation deduplication.
#[derive(Debug, Clone)]
pub struct DeduplicationConfig {
    /// Sections smaller than this are backfilled (default: 8)
    pub min_papers_per_section: usize,
    /// Whether backfill is allowed at all (default: true)
    pub enable_backfill: bool,
}

impl Default for DeduplicationConfig {
    fn default() -> Self {
        Self {
            min_papers_per_section: MIN_PAPERS_PER_SECTION,
            enable_backfill: true,
        }
    }
}

/// Counters describing one deduplication pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeduplicationStats {
    /// Repeats removed inside a category
    pub within_category: usize,
    /// Entries removed because a higher-priority category holds them
    pub cross_category: usize,
    /// Entries re-inserted as backfill duplicates
    pub backfilled: usize,
}

/// Deduplicate sections within and across categories.
///
/// Categories are processed in priority order regardless of map contents;
/// every category is present in the output, possibly empty. Each output
/// section is sorted by descending score.
pub fn deduplicate_sections(
    mut sections: CategorySections,
    config: &DeduplicationConfig,
) -> (CategorySections, DeduplicationStats) {
    let mut stats = DeduplicationStats::default();
    let mut claimed: HashSet<String> = HashSet::new();
    let mut output = CategorySections::new();

    for category in RecommendationCategory::ALL {
        let candidates = sections.remove(&category).unwrap_or_default();

        // Pass 1: within category, first occurrence wins.
        let mut local: HashSet<String> = HashSet::new();
        let before = candidates.len();
        let unique: Vec<CandidatePaper> = candidates
            .into_iter()
            .filter(|c| local.insert(c.id.clone()))
            .map(|mut c| {
                c.category = category;
                c.is_backfill_duplicate = false;
                c
            })
            .collect();
        stats.within_category += before - unique.len();

        // Pass 2: across categories, higher priority wins.
        let (mut kept, mut dropped): (Vec<CandidatePaper>, Vec<CandidatePaper>) =
            unique.into_iter().partition(|c| !claimed.contains(&c.id));
        claimed.extend(kept.iter().map(|c| c.id.clone()));
        stats.cross_category += dropped.len();

        // Backfill with the highest-scoring lost papers.
        if config.enable_backfill && kept.len() < config.min_papers_per_section && !dropped.is_empty()
        {
            sort_by_score(&mut dropped);
            let needed = config.min_papers_per_section - kept.len();
            let refill: Vec<CandidatePaper> = dropped
                .into_iter()
                .take(needed)
                .map(|mut c| {
                    c.is_backfill_duplicate = true;
                    c
                })
                .collect();
            if !refill.is_empty() {
                debug!(
                    { logging::CATEGORY } = %category,
                    { logging::BACKFILL_COUNT } = refill.len(),
                    "Backfilling short section"
                );
            }
            stats.backfilled += refill.len();
            kept.extend(refill);
        }

        sort_by_score(&mut kept);
        output.insert(category, kept);
    }

    (output, stats)
}

fn sort_by_score(papers: &mut [CandidatePaper]) {
    papers.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
}

/// Assembles the final [`RecommendationSet`].
#[derive(Debug, Clone, Default)]
pub struct Deduplicator {
    config: DeduplicationConfig,
}

impl Deduplicator {
    pub fn new(config: DeduplicationConfig) -> Self {
        Self { config }
    }

    pub fn deduplicate(&self, sections: CategorySections, profile: UserProfile) -> RecommendationSet {
        let (categories, stats) = deduplicate_sections(sections, &self.config);
        info!(
            subsystem = "recommend",
            component = "deduplicator",
            within_category = stats.within_category,
            cross_category = stats.cross_category,
            { logging::BACKFILL_COUNT } = stats.backfilled,
            "Sections deduplicated"
        );
        RecommendationSet {
            categories,
            generated_at: Utc::now(),
            profile_snapshot: profile,
        }
    }
}
