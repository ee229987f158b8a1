//! Request entry point: profile, generate, deduplicate, enrich, cache.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use paperwise_core::{
    logging, CacheKey, CandidateSource, Error, ProfileSignalStore, RecommendationSet,
    RecommendationStore, Result, SemanticAnnotator,
};
use tokio::time::{timeout_at, Instant as TokioInstant};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::cache::{CacheStats, InMemoryStore, RecommendationCache};
use crate::config::RecommendationConfig;
use crate::deduplication::{CategorySections, DeduplicationConfig, Deduplicator};
use crate::enrichment::{Enricher, RankingStrategy};
use crate::exclusion::ExclusionSet;
use crate::generators::{default_generators, CategoryGenerator, GenerationContext};
use crate::profile::ProfileBuilder;

/// Computes and caches weekly recommendation sets.
pub struct RecommendationOrchestrator {
    profile_builder: ProfileBuilder,
    source: Arc<dyn CandidateSource>,
    generators: Vec<Box<dyn CategoryGenerator>>,
    deduplicator: Deduplicator,
    enricher: Enricher,
    cache: RecommendationCache,
    config: RecommendationConfig,
}

impl RecommendationOrchestrator {
    pub fn builder(
        signals: Arc<dyn ProfileSignalStore>,
        source: Arc<dyn CandidateSource>,
    ) -> OrchestratorBuilder {
        OrchestratorBuilder {
            signals,
            source,
            store: None,
            config: RecommendationConfig::default(),
            ranking: RankingStrategy::Deterministic,
            annotator: None,
        }
    }

    pub fn config(&self) -> &RecommendationConfig {
        &self.config
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Drop every cached set.
    pub async fn clear_cache(&self) -> Result<()> {
        self.cache.clear().await
    }

    /// Weekly recommendations for a user, within the configured deadline.
    pub async fn get_weekly_recommendations(
        &self,
        user_id: Uuid,
        project_id: Option<Uuid>,
        force_refresh: bool,
    ) -> Result<RecommendationSet> {
        self.get_weekly_recommendations_with_deadline(
            user_id,
            project_id,
            force_refresh,
            self.config.request_deadline(),
        )
        .await
    }

    /// Weekly recommendations with an explicit time budget.
    ///
    /// A fresh cached set is returned unless `force_refresh` is set. A
    /// recomputed set always replaces the cached one. When the budget runs
    /// out, generators return what they have collected and enrichment is
    /// skipped; only a failing signal store fails the request.
    #[instrument(
        skip(self, user_id, project_id),
        fields(
            subsystem = "recommend",
            component = "orchestrator",
            op = "get_weekly_recommendations",
            user_id = %user_id,
            project_id = %project_id.map(|p| p.to_string()).unwrap_or_else(|| "global".to_string()),
        )
    )]
    pub async fn get_weekly_recommendations_with_deadline(
        &self,
        user_id: Uuid,
        project_id: Option<Uuid>,
        force_refresh: bool,
        budget: Duration,
    ) -> Result<RecommendationSet> {
        let start = Instant::now();
        let deadline = TokioInstant::now() + budget;
        let key = CacheKey::new(user_id, project_id);

        if !force_refresh {
            if let Some(cached) = self.cache.get(&key).await {
                info!(
                    { logging::CACHE_HIT } = true,
                    { logging::RESULT_COUNT } = cached.total_papers(),
                    { logging::DURATION_MS } = start.elapsed().as_millis() as u64,
                    "Weekly recommendations served from cache"
                );
                return Ok(cached);
            }
        }

        let profile = self.profile_builder.build(user_id, project_id).await?;

        let ctx = GenerationContext {
            source: self.source.clone(),
            config: self.config.clone(),
            today: Utc::now().date_naive(),
            deadline,
        };
        let mut exclusion = ExclusionSet::new();
        let mut sections = CategorySections::new();
        for generator in &self.generators {
            let (papers, updated) = generator.generate(&profile, exclusion, &ctx).await;
            exclusion = updated;
            sections.insert(generator.category(), papers);
        }

        let set = self.deduplicator.deduplicate(sections, profile);
        let set = if self.enricher.is_noop() {
            set
        } else {
            match timeout_at(deadline, self.enricher.enrich(set.clone())).await {
                Ok(enriched) => enriched,
                Err(_) => {
                    warn!("Deadline reached during enrichment, returning unenriched set");
                    set
                }
            }
        };

        self.cache.put(key, set.clone()).await;

        info!(
            { logging::CACHE_HIT } = false,
            { logging::SIGNAL_SOURCE } = %set.profile_snapshot.signal_source,
            { logging::RESULT_COUNT } = set.total_papers(),
            sections = ?section_sizes(&set),
            { logging::DURATION_MS } = start.elapsed().as_millis() as u64,
            "Weekly recommendations computed"
        );
        Ok(set)
    }
}

fn section_sizes(set: &RecommendationSet) -> BTreeMap<&'static str, usize> {
    set.categories
        .iter()
        .map(|(c, papers)| (c.as_str(), papers.len()))
        .collect()
}

/// Builder for [`RecommendationOrchestrator`].
pub struct OrchestratorBuilder {
    signals: Arc<dyn ProfileSignalStore>,
    source: Arc<dyn CandidateSource>,
    store: Option<Arc<dyn RecommendationStore>>,
    config: RecommendationConfig,
    ranking: RankingStrategy,
    annotator: Option<Arc<dyn SemanticAnnotator>>,
}

impl OrchestratorBuilder {
    pub fn with_config(mut self, config: RecommendationConfig) -> Self {
        self.config = config;
        self
    }

    /// Shared cache backend; defaults to a process-local store.
    pub fn with_cache_store(mut self, store: Arc<dyn RecommendationStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn with_ranking(mut self, ranking: RankingStrategy) -> Self {
        self.ranking = ranking;
        self
    }

    pub fn with_annotator(mut self, annotator: Arc<dyn SemanticAnnotator>) -> Self {
        self.annotator = Some(annotator);
        self
    }

    pub fn build(self) -> Result<RecommendationOrchestrator> {
        self.config
            .validate()
            .map_err(|e| Error::Config(e.to_string()))?;

        let store = self
            .store
            .unwrap_or_else(|| Arc::new(InMemoryStore::new()) as Arc<dyn RecommendationStore>);

        Ok(RecommendationOrchestrator {
            profile_builder: ProfileBuilder::new(self.signals, self.config.profile_domain_limit),
            source: self.source,
            generators: default_generators(),
            deduplicator: Deduplicator::new(DeduplicationConfig {
                min_papers_per_section: self.config.min_papers_per_section,
                enable_backfill: self.config.enable_backfill,
            }),
            enricher: Enricher::new(
                self.ranking,
                self.annotator,
                self.config.annotation_concurrency,
            ),
            cache: RecommendationCache::new(store, self.config.cache_ttl()),
            config: self.config,
        })
    }
}
