//! Optional post-processing of a deduplicated recommendation set.
//!
//! Enrichment never changes which papers are recommended. An LLM ranker may
//! adjust scores and reasons within a category; a semantic annotator may
//! attach metadata to each paper. Any failure leaves the affected papers
//! exactly as they were.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

use futures::future::join_all;
use paperwise_core::{
    logging, CandidatePaper, CandidateRanker, RecommendationCategory, RecommendationSet,
    SemanticAnalysis, SemanticAnnotator, UserProfile,
};
use tokio::sync::Semaphore;
use tracing::{debug, instrument, warn};

/// How papers are ordered within a category.
#[derive(Clone, Default)]
pub enum RankingStrategy {
    /// Keep generator scores
    #[default]
    Deterministic,
    /// Let a ranker adjust scores and reasons
    Llm(Arc<dyn CandidateRanker>),
}

impl std::fmt::Debug for RankingStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Deterministic => write!(f, "Deterministic"),
            Self::Llm(_) => write!(f, "Llm"),
        }
    }
}

/// Applies the ranking strategy and semantic annotation.
#[derive(Clone)]
pub struct Enricher {
    ranking: RankingStrategy,
    annotator: Option<Arc<dyn SemanticAnnotator>>,
    concurrency: usize,
}

impl Enricher {
    pub fn new(
        ranking: RankingStrategy,
        annotator: Option<Arc<dyn SemanticAnnotator>>,
        concurrency: usize,
    ) -> Self {
        Self {
            ranking,
            annotator,
            concurrency: concurrency.max(1),
        }
    }

    /// True when enrichment leaves every set untouched.
    pub fn is_noop(&self) -> bool {
        matches!(self.ranking, RankingStrategy::Deterministic) && self.annotator.is_none()
    }

    #[instrument(
        skip(self, set),
        fields(subsystem = "recommend", component = "enricher", op = "enrich")
    )]
    pub async fn enrich(&self, mut set: RecommendationSet) -> RecommendationSet {
        if self.is_noop() {
            return set;
        }
        if let RankingStrategy::Llm(ranker) = &self.ranking {
            for (category, papers) in set.categories.iter_mut() {
                rerank(ranker.as_ref(), &set.profile_snapshot, *category, papers).await;
            }
        }
        if let Some(annotator) = &self.annotator {
            self.annotate(annotator.clone(), &mut set).await;
        }
        set
    }

    /// Annotate every distinct paper with bounded concurrency.
    async fn annotate(&self, annotator: Arc<dyn SemanticAnnotator>, set: &mut RecommendationSet) {
        let mut unique: HashMap<String, CandidatePaper> = HashMap::new();
        for paper in set.categories.values().flatten() {
            unique
                .entry(paper.id.clone())
                .or_insert_with(|| paper.clone());
        }
        if unique.is_empty() {
            return;
        }

        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let tasks = unique.into_values().map(|paper| {
            let semaphore = semaphore.clone();
            let annotator = annotator.clone();
            async move {
                let Ok(_permit) = semaphore.acquire().await else {
                    return (paper.id, None);
                };
                match annotator.annotate(&paper).await {
                    Ok(analysis) => (paper.id, Some(analysis)),
                    Err(e) => {
                        warn!(
                            paper_id = %paper.id,
                            { logging::ERROR_MSG } = %e,
                            "Semantic annotation failed"
                        );
                        (paper.id, None)
                    }
                }
            }
        });

        let annotations: HashMap<String, SemanticAnalysis> = join_all(tasks)
            .await
            .into_iter()
            .filter_map(|(id, analysis)| analysis.map(|a| (id, a)))
            .collect();
        debug!(annotated = annotations.len(), "Semantic annotation complete");

        for paper in set.categories.values_mut().flatten() {
            if let Some(analysis) = annotations.get(&paper.id) {
                paper.semantic_analysis = Some(analysis.clone());
            }
        }
    }
}

impl Default for Enricher {
    fn default() -> Self {
        Self::new(
            RankingStrategy::Deterministic,
            None,
            paperwise_core::defaults::ANNOTATION_CONCURRENCY,
        )
    }
}

/// Apply ranker adjustments to one category; on failure keep it unchanged.
async fn rerank(
    ranker: &dyn CandidateRanker,
    profile: &UserProfile,
    category: RecommendationCategory,
    papers: &mut [CandidatePaper],
) {
    if papers.is_empty() {
        return;
    }
    let ranked = match ranker.rank(profile, category, papers).await {
        Ok(ranked) => ranked,
        Err(e) => {
            warn!(
                { logging::CATEGORY } = %category,
                { logging::ERROR_MSG } = %e,
                "LLM ranking failed, keeping deterministic order"
            );
            return;
        }
    };

    let adjustments: HashMap<&str, _> = ranked.iter().map(|r| (r.id.as_str(), r)).collect();
    let mut applied = 0;
    for paper in papers.iter_mut() {
        if let Some(r) = adjustments.get(paper.id.as_str()) {
            if r.score.is_finite() {
                paper.score = r.score;
                applied += 1;
            }
            if !r.reason.trim().is_empty() {
                paper.reason = r.reason.trim().to_string();
            }
        }
    }
    papers.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
    debug!({ logging::CATEGORY } = %category, applied, "LLM ranking applied");
}
