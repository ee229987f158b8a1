//! LLM semantic annotation of single papers.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::instrument;

use paperwise_core::domains::canonical_domain;
use paperwise_core::{CandidatePaper, Error, Result, SemanticAnalysis, SemanticAnnotator};

use crate::json::parse_json_lenient;
use crate::GenerationBackend;

const ANNOTATOR_SYSTEM_PROMPT: &str = "You classify research papers. Respond with one JSON object \
with the fields \"methodology\" (short label such as \"randomized controlled trial\"), \
\"complexity_score\" (0 to 1), \"domains\" (list of research domains) and \
\"confidence_scores\" (object mapping each domain to a confidence from 0 to 1).";

#[derive(Debug, Deserialize)]
struct AnnotationOutput {
    #[serde(default)]
    methodology: String,
    #[serde(default)]
    complexity_score: f32,
    #[serde(default)]
    domains: Vec<String>,
    #[serde(default)]
    confidence_scores: HashMap<String, f32>,
}

/// Annotates papers with methodology, complexity and domains.
pub struct LlmSemanticAnnotator {
    backend: Arc<dyn GenerationBackend>,
}

impl LlmSemanticAnnotator {
    pub fn new(backend: Arc<dyn GenerationBackend>) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl SemanticAnnotator for LlmSemanticAnnotator {
    #[instrument(skip(self, paper), fields(subsystem = "inference", component = "annotator", op = "annotate", paper_id = %paper.id))]
    async fn annotate(&self, paper: &CandidatePaper) -> Result<SemanticAnalysis> {
        let mut prompt = format!("Title: {}\nYear: {}\n", paper.title, paper.year);
        if let Some(journal) = &paper.journal {
            prompt.push_str(&format!("Journal: {}\n", journal));
        }

        let raw = self
            .backend
            .generate_json_with_system(ANNOTATOR_SYSTEM_PROMPT, &prompt)
            .await?;
        let output: AnnotationOutput = parse_json_lenient(&raw).map_err(|e| {
            Error::Inference(format!("Annotator returned unparseable output: {}", e))
        })?;

        let mut domains: Vec<String> = Vec::new();
        for domain in output.domains.iter().map(|d| canonical_domain(d)) {
            if !domain.is_empty() && !domains.contains(&domain) {
                domains.push(domain);
            }
        }
        let confidence_scores = output
            .confidence_scores
            .into_iter()
            .filter(|(_, c)| c.is_finite())
            .map(|(d, c)| (canonical_domain(&d), c.clamp(0.0, 1.0)))
            .collect();

        Ok(SemanticAnalysis {
            methodology: output.methodology.trim().to_string(),
            complexity_score: if output.complexity_score.is_finite() {
                output.complexity_score.clamp(0.0, 1.0)
            } else {
                0.0
            },
            domains,
            confidence_scores,
        })
    }
}
