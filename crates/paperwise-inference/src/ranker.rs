//! LLM re-ranking of one recommendation category.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use paperwise_core::{
    logging, CandidatePaper, CandidateRanker, Error, RankedPaper, RecommendationCategory, Result,
    UserProfile,
};

use crate::json::parse_json_lenient;
use crate::GenerationBackend;

const RANKER_SYSTEM_PROMPT: &str = "You rank research papers for a researcher. \
Respond with a JSON array only. Each element is an object with the fields \
\"id\" (copied from the input), \"score\" (a number from 0 to 1, higher is more relevant) \
and \"reason\" (one sentence addressed to the researcher).";

/// Papers beyond this count are not sent to the model.
pub const MAX_PAPERS_PER_PROMPT: usize = 30;

#[derive(Debug, Deserialize)]
struct RankedEntry {
    id: String,
    #[serde(default)]
    score: Option<f32>,
    #[serde(default)]
    reason: Option<String>,
}

/// Ranks candidates with a generation backend.
pub struct LlmRanker {
    backend: Arc<dyn GenerationBackend>,
}

impl LlmRanker {
    pub fn new(backend: Arc<dyn GenerationBackend>) -> Self {
        Self { backend }
    }

    fn build_prompt(
        profile: &UserProfile,
        category: RecommendationCategory,
        papers: &[CandidatePaper],
    ) -> String {
        let interests = profile
            .primary_domains
            .iter()
            .map(|d| format!("{} ({:.2})", d.replace('_', " "), profile.confidence(d)))
            .collect::<Vec<_>>()
            .join(", ");

        let mut prompt = format!(
            "Researcher interests: {}\nSection: {}\n\nPapers:\n",
            interests,
            category.as_str().replace('_', " ")
        );
        for paper in papers.iter().take(MAX_PAPERS_PER_PROMPT) {
            prompt.push_str(&format!(
                "- id: {} | {} ({}) | citations: {} | current reason: {}\n",
                paper.id, paper.title, paper.year, paper.citation_count, paper.reason
            ));
        }
        prompt.push_str("\nRank every paper above.");
        prompt
    }
}

#[async_trait]
impl CandidateRanker for LlmRanker {
    #[instrument(
        skip(self, profile, category, papers),
        fields(subsystem = "inference", component = "ranker", op = "rank", category = %category, input_count = papers.len())
    )]
    async fn rank(
        &self,
        profile: &UserProfile,
        category: RecommendationCategory,
        papers: &[CandidatePaper],
    ) -> Result<Vec<RankedPaper>> {
        if papers.is_empty() {
            return Ok(Vec::new());
        }

        let prompt = Self::build_prompt(profile, category, papers);
        let raw = self
            .backend
            .generate_json_with_system(RANKER_SYSTEM_PROMPT, &prompt)
            .await?;

        let entries: Vec<RankedEntry> = parse_json_lenient(&raw).map_err(|e| {
            Error::Inference(format!("Ranker returned unparseable output: {}", e))
        })?;

        let known: HashSet<&str> = papers.iter().map(|p| p.id.as_str()).collect();
        let mut seen = HashSet::new();
        let mut ranked = Vec::with_capacity(entries.len());
        for entry in entries {
            if !known.contains(entry.id.as_str()) || !seen.insert(entry.id.clone()) {
                continue;
            }
            let Some(score) = entry.score.filter(|s| s.is_finite()) else {
                warn!(paper_id = %entry.id, "Ranker entry without a usable score");
                continue;
            };
            ranked.push(RankedPaper {
                id: entry.id,
                score: score.clamp(0.0, 1.0),
                reason: entry.reason.unwrap_or_default(),
            });
        }

        debug!({ logging::RESULT_COUNT } = ranked.len(), model = self.backend.model_name(), "Ranking parsed");
        Ok(ranked)
    }
}
