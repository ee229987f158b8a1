//! Scripted generation backend and fixtures for unit tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use paperwise_core::{
    ActivityLevel, CandidatePaper, Error, RecommendationCategory, Result, SignalSource,
    UserProfile,
};

use crate::GenerationBackend;

/// Replies with a fixed string, or fails, and records prompts.
pub struct ScriptedBackend {
    reply: Option<String>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedBackend {
    pub fn replying(reply: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Some(reply.to_string()),
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            reply: None,
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    pub fn last_prompt(&self) -> String {
        self.prompts.lock().unwrap().last().cloned().unwrap_or_default()
    }
}

#[async_trait]
impl GenerationBackend for ScriptedBackend {
    async fn generate_json_with_system(&self, _system: &str, prompt: &str) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.reply
            .clone()
            .ok_or_else(|| Error::Inference("model unavailable".to_string()))
    }

    fn model_name(&self) -> &str {
        "scripted"
    }
}

pub fn candidate(id: &str, title: &str) -> CandidatePaper {
    CandidatePaper {
        id: id.to_string(),
        title: title.to_string(),
        authors: vec!["Ng P".to_string()],
        year: 2024,
        citation_count: 3,
        journal: Some("Kidney International".to_string()),
        score: 0.5,
        category: RecommendationCategory::PapersForYou,
        reason: "Matches nephrology".to_string(),
        is_backfill_duplicate: false,
        semantic_analysis: None,
    }
}

pub fn profile() -> UserProfile {
    UserProfile {
        primary_domains: vec!["nephrology".to_string()],
        domain_confidence: HashMap::from([("nephrology".to_string(), 0.9)]),
        signal_source: SignalSource::ExplicitActivity,
        activity_level: ActivityLevel::Active,
    }
}
