use paperwise_core::{keywords_for, CandidateQuery, RecommendationCategory, SortBy, SourcePaper, UserProfile};

use super::{CategoryGenerator, GenerationContext, Scored};
use crate::ladder::Rung;
use crate::scoring::{age_in_years, citation_opportunity_score, domain_match_strength};

/// Recent papers in the user's domain that few others have cited yet.
pub struct CitationOpportunitiesGenerator;

impl CategoryGenerator for CitationOpportunitiesGenerator {
    fn category(&self) -> RecommendationCategory {
        RecommendationCategory::CitationOpportunities
    }

    fn rungs(&self, profile: &UserProfile, ctx: &GenerationContext) -> Vec<Rung> {
        let ladder = &ctx.config.ladder;
        let domains = ctx.query_domains(profile);
        let narrow = ctx.expand_terms(domains, Some(ladder.keywords_per_domain));
        let broad = ctx.expand_terms(domains, None);
        let primary = profile.primary_domain().map(keywords_for).unwrap_or_default();
        let window_start = ctx.current_year() - ctx.config.citation_max_age_years;

        vec![
            Rung::new(
                "recent",
                CandidateQuery::any_of(narrow)
                    .published_since(ctx.current_year() - ladder.recent_years)
                    .sorted_by(SortBy::Date)
                    .limit(ladder.results_per_rung),
            ),
            Rung::new(
                "window",
                CandidateQuery::any_of(primary)
                    .published_since(window_start)
                    .sorted_by(SortBy::Date)
                    .limit(ladder.results_per_rung),
            ),
            Rung::new(
                "window_broad",
                CandidateQuery::any_of(broad)
                    .published_since(window_start)
                    .limit(ladder.results_per_rung),
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
        let age = age_in_years(paper.year, ctx.today);
        let strength = domain_match_strength(profile, ctx.query_domains(profile), &paper.search_text());
        let score = citation_opportunity_score(
            paper.citation_count,
            age,
            ctx.config.citation_ceiling,
            ctx.config.citation_max_age_years,
            strength,
        );
        if score <= 0.0 {
            return None;
        }

        let reason = match paper.citation_count {
            0 => format!("Published {} and not yet cited", paper.year),
            1 => format!("Published {} with only 1 citation", paper.year),
            n => format!("Published {} with only {} citations", paper.year, n),
        };
        Some(Scored::new(score, reason))
    }
}
