//! Category generators.
//!
//! Each generator turns a profile into one recommendation section. They run
//! strictly in priority order, because each one must see the ids claimed by
//! every earlier one.
//!
//! A generator only declares its ladder and how it scores a paper; the
//! shared [`CategoryGenerator::generate`] runs the ladder, ranks the hits,
//! keeps the section target and claims the kept ids. Eligible papers already
//! claimed by an earlier category fill any remaining slots unclaimed, so the
//! deduplicator has something to backfill a short section with.

mod citation_opportunities;
mod cross_pollination;
mod papers_for_you;
mod trending;

pub use citation_opportunities::CitationOpportunitiesGenerator;
pub use cross_pollination::CrossPollinationGenerator;
pub use papers_for_you::PapersForYouGenerator;
pub use trending::TrendingGenerator;

use std::cmp::Ordering;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Datelike, NaiveDate};
use paperwise_core::{
    keywords_for, logging, CandidatePaper, CandidateSource, RecommendationCategory, SourcePaper,
    UserProfile,
};
use tokio::time::Instant;
use tracing::{debug, info};

use crate::config::RecommendationConfig;
use crate::exclusion::ExclusionSet;
use crate::ladder::{climb, Rung};

/// Per-request inputs shared by all generators.
#[derive(Clone)]
pub struct GenerationContext {
    pub source: Arc<dyn CandidateSource>,
    pub config: RecommendationConfig,
    /// Date the request is evaluated at
    pub today: NaiveDate,
    /// Instant after which no further upstream query is started
    pub deadline: Instant,
}

impl GenerationContext {
    pub fn current_year(&self) -> i32 {
        self.today.year()
    }

    /// Domains a generator expands into query terms.
    pub fn query_domains<'a>(&self, profile: &'a UserProfile) -> &'a [String] {
        profile.top_domains(self.config.generator_domain_count)
    }

    /// The first `per_domain` keywords of each domain, without repeats.
    pub fn expand_terms(&self, domains: &[String], per_domain: Option<usize>) -> Vec<String> {
        let mut terms: Vec<String> = Vec::new();
        for domain in domains {
            let keywords = keywords_for(domain);
            let take = per_domain.unwrap_or(keywords.len());
            for keyword in keywords.into_iter().take(take) {
                if !terms.contains(&keyword) {
                    terms.push(keyword);
                }
            }
        }
        terms
    }
}

/// Score and explanation of an eligible paper.
#[derive(Debug, Clone, PartialEq)]
pub struct Scored {
    pub score: f32,
    pub reason: String,
}

impl Scored {
    pub fn new(score: f32, reason: impl Into<String>) -> Self {
        Self {
            score,
            reason: reason.into(),
        }
    }
}

/// Produces the candidates of one recommendation category.
#[async_trait]
pub trait CategoryGenerator: Send + Sync {
    fn category(&self) -> RecommendationCategory;

    /// Ladder rungs for this profile, narrowest first.
    fn rungs(&self, profile: &UserProfile, ctx: &GenerationContext) -> Vec<Rung>;

    /// Score a paper, or `None` when it does not belong in this category.
    fn score(
        &self,
        paper: &SourcePaper,
        rung: &Rung,
        profile: &UserProfile,
        ctx: &GenerationContext,
    ) -> Option<Scored>;

    /// Generate this category's section.
    ///
    /// Takes the exclusion set by value and returns it with the accepted ids
    /// added. The returned list is the pre-deduplication section: accepted
    /// papers first, then surplus papers another category already holds.
    /// Never fails: upstream problems yield a short or empty section.
    async fn generate(
        &self,
        profile: &UserProfile,
        exclusion: ExclusionSet,
        ctx: &GenerationContext,
    ) -> (Vec<CandidatePaper>, ExclusionSet) {
        let category = self.category();
        let rungs = self.rungs(profile, ctx);
        let target = ctx.config.section_target_size;

        let outcome = climb(ctx.source.as_ref(), &rungs, &exclusion, target, ctx.deadline, |p, r| {
            self.score(p, r, profile, ctx).filter(|s| s.score > 0.0)
        })
        .await;

        let surplus = outcome.surplus.len();
        let candidates = rank_and_claim(category, outcome.hits, outcome.surplus, target, exclusion);

        info!(
            subsystem = "recommend",
            component = "generator",
            { logging::CATEGORY } = %category,
            { logging::RESULT_COUNT } = candidates.0.len(),
            surplus,
            rungs_tried = outcome.rungs_tried,
            deadline_reached = outcome.deadline_reached,
            "Category generated"
        );
        candidates
    }
}

/// Sort by score, keep the target size and claim the kept ids.
///
/// Surplus papers fill the slots left below `target` without being claimed.
fn rank_and_claim(
    category: RecommendationCategory,
    mut hits: Vec<(SourcePaper, Scored)>,
    mut surplus: Vec<(SourcePaper, Scored)>,
    target: usize,
    mut exclusion: ExclusionSet,
) -> (Vec<CandidatePaper>, ExclusionSet) {
    sort_scored(&mut hits);
    hits.truncate(target);
    for (paper, _) in &hits {
        exclusion.insert(paper.id.clone());
    }

    sort_scored(&mut surplus);
    surplus.truncate(target - hits.len());

    let candidates: Vec<CandidatePaper> = hits
        .into_iter()
        .chain(surplus)
        .map(|(paper, scored)| paper.into_candidate(category, scored.score, scored.reason))
        .collect();

    debug!(
        { logging::CATEGORY } = %category,
        excluded = exclusion.len(),
        "Exclusion set updated"
    );
    (candidates, exclusion)
}

fn sort_scored(papers: &mut [(SourcePaper, Scored)]) {
    papers.sort_by(|a, b| b.1.score.partial_cmp(&a.1.score).unwrap_or(Ordering::Equal));
}

/// All generators in priority order.
pub fn default_generators() -> Vec<Box<dyn CategoryGenerator>> {
    vec![
        Box::new(PapersForYouGenerator),
        Box::new(TrendingGenerator),
        Box::new(CrossPollinationGenerator),
        Box::new(CitationOpportunitiesGenerator),
    ]
}

/// Human-readable domain label, e.g. "infectious disease".
pub(crate) fn display_domain(domain: &str) -> String {
    domain.replace('_', " ")
}


#[cfg(test)]
mod tests {
    use super::test_context::*;
    use super::*;
    use crate::test_support::{paper, CatalogSource};

    #[test]
    fn test_default_generators_in_priority_order() {
        let categories: Vec<RecommendationCategory> =
            default_generators().iter().map(|g| g.category()).collect();
        assert_eq!(categories, RecommendationCategory::ALL.to_vec());
    }

    #[test]
    fn test_expand_terms_dedups() {
        let ctx = context(CatalogSource::default());
        let domains = vec!["nephrology".to_string(), "nephrology".to_string()];
        assert_eq!(
            ctx.expand_terms(&domains, Some(2)),
            vec!["kidney".to_string(), "renal".to_string()]
        );
        assert!(ctx.expand_terms(&domains, None).len() > 2);
    }

    #[test]
    fn test_rank_and_claim_sorts_truncates_and_claims() {
        let hits = vec![
            (paper("A", "a", 2024, 1), Scored::new(0.2, "a")),
            (paper("B", "b", 2024, 1), Scored::new(0.9, "b")),
            (paper("C", "c", 2024, 1), Scored::new(0.5, "c")),
        ];
        let (papers, exclusion) = rank_and_claim(
            RecommendationCategory::Trending,
            hits,
            Vec::new(),
            2,
            ExclusionSet::new(),
        );
        let ids: Vec<&str> = papers.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["B", "C"]);
        assert!(papers.iter().all(|p| p.category == RecommendationCategory::Trending));
        assert!(exclusion.contains("B") && exclusion.contains("C"));
        assert!(!exclusion.contains("A"));
    }

    #[test]
    fn test_rank_and_claim_surplus_fills_without_claiming() {
        let hits = vec![(paper("A", "a", 2024, 1), Scored::new(0.2, "a"))];
        let surplus = vec![
            (paper("S1", "s1", 2024, 1), Scored::new(0.4, "s1")),
            (paper("S2", "s2", 2024, 1), Scored::new(0.9, "s2")),
        ];
        let claimed: ExclusionSet = ["S1", "S2"].into_iter().collect();
        let (papers, exclusion) = rank_and_claim(
            RecommendationCategory::Trending,
            hits,
            surplus,
            2,
            claimed,
        );

        let ids: Vec<&str> = papers.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["A", "S2"]);
        assert_eq!(exclusion.len(), 3);
        assert!(exclusion.contains("A"));
    }

    #[tokio::test]
    async fn test_generators_share_exclusion_in_sequence() {
        let mut papers = Vec::new();
        for i in 0..30 {
            papers.push(paper(
                &format!("P{}", i),
                &format!("Kidney drug dosing study {}", i),
                2021 + (i % 4),
                (i * 3) as u32,
            ));
        }
        let ctx = context(CatalogSource::new(papers));
        let profile = nephrology_profile();

        let mut exclusion = ExclusionSet::new();
        let mut seen = std::collections::HashSet::new();
        for generator in default_generators() {
            let before = exclusion.clone();
            let (section, updated) = generator.generate(&profile, exclusion, &ctx).await;
            for p in section.iter().filter(|p| !before.contains(&p.id)) {
                assert!(seen.insert(p.id.clone()), "{} selected twice", p.id);
                assert!(updated.contains(&p.id));
            }
            exclusion = updated;
        }
        assert_eq!(exclusion.len(), seen.len());
    }
}
