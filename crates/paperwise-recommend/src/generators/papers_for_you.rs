use paperwise_core::{keywords_for, CandidateQuery, RecommendationCategory, SortBy, SourcePaper, UserProfile};

use super::{display_domain, CategoryGenerator, GenerationContext, Scored};
use crate::ladder::Rung;
use crate::scoring::{best_matching_domain, domain_match_strength};

/// Baseline for papers the source matched on terms we cannot see locally
/// (e.g. abstract-only matches).
const SOURCE_MATCH_BASELINE: f32 = 0.1;

/// Papers matching the user's own domains.
pub struct PapersForYouGenerator;

impl CategoryGenerator for PapersForYouGenerator {
    fn category(&self) -> RecommendationCategory {
        RecommendationCategory::PapersForYou
    }

    fn rungs(&self, profile: &UserProfile, ctx: &GenerationContext) -> Vec<Rung> {
        let ladder = &ctx.config.ladder;
        let domains = ctx.query_domains(profile);
        let narrow = ctx.expand_terms(domains, Some(ladder.keywords_per_domain));
        let broad = ctx.expand_terms(domains, None);
        let primary = profile.primary_domain().map(keywords_for).unwrap_or_default();
        let year = ctx.current_year();

        vec![
            Rung::new(
                "recent",
                CandidateQuery::any_of(narrow.clone())
                    .published_since(year - ladder.recent_years)
                    .sorted_by(SortBy::Date)
                    .limit(ladder.results_per_rung),
            ),
            Rung::new(
                "wide",
                CandidateQuery::any_of(narrow)
                    .published_since(year - ladder.wide_years)
                    .limit(ladder.results_per_rung),
            ),
            Rung::new(
                "primary_any_date",
                CandidateQuery::any_of(primary).limit(ladder.results_per_rung),
            ),
            Rung::new(
                "broad",
                CandidateQuery::any_of(broad).limit(ladder.results_per_rung),
            ),
        ]
    }

    fn score(
        &self,
        paper: &SourcePaper,
        _rung: &Rung,
        profile: &UserProfile,
        ctx: &GenerationContext,
    ) -> Option<Scored> {
        let domains = ctx.query_domains(profile);
        let text = paper.search_text();
        let strength = domain_match_strength(profile, domains, &text);

        let reason = match best_matching_domain(domains, &text).or(profile.primary_domain()) {
            Some(domain) => format!("Matches your interest in {}", display_domain(domain)),
            None => "Related to your recent reading".to_string(),
        };
        Some(Scored::new(SOURCE_MATCH_BASELINE + strength, reason))
    }
}
