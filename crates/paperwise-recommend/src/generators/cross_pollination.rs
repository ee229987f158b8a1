use paperwise_core::domains::count_keyword_hits;
use paperwise_core::{
    adjacent_domains, keywords_for, CandidateQuery, RecommendationCategory, SortBy, SourcePaper,
    UserProfile,
};

use super::{display_domain, CategoryGenerator, GenerationContext, Scored};
use crate::ladder::Rung;
use crate::scoring::cross_pollination_score;

/// Score given when the query already required both domains but the
/// locally visible text only shows one side.
const SOURCE_ENFORCED_SCORE: f32 = 0.5;

/// Papers bridging the user's primary domain with an adjacent one.
pub struct CrossPollinationGenerator;

impl CrossPollinationGenerator {
    fn domains(profile: &UserProfile) -> Option<(String, String)> {
        let primary = profile.primary_domain()?;
        let adjacent = adjacent_domains(primary).into_iter().next()?;
        Some((primary.to_string(), adjacent))
    }
}

impl CategoryGenerator for CrossPollinationGenerator {
    fn category(&self) -> RecommendationCategory {
        RecommendationCategory::CrossPollination
    }

    fn rungs(&self, profile: &UserProfile, ctx: &GenerationContext) -> Vec<Rung> {
        let Some((primary, adjacent)) = Self::domains(profile) else {
            return Vec::new();
        };
        let ladder = &ctx.config.ladder;
        let per_domain = ladder.keywords_per_domain;
        let primary_narrow = ctx.expand_terms(std::slice::from_ref(&primary), Some(per_domain));
        let adjacent_narrow = ctx.expand_terms(std::slice::from_ref(&adjacent), Some(per_domain));
        let primary_all = keywords_for(&primary);
        let adjacent_all = keywords_for(&adjacent);
        let year = ctx.current_year();

        vec![
            Rung::new(
                "recent",
                CandidateQuery::any_of(primary_narrow.clone())
                    .and_any_of(adjacent_narrow.clone())
                    .published_since(year - ladder.recent_years)
                    .sorted_by(SortBy::Date)
                    .limit(ladder.results_per_rung),
            ),
            Rung::new(
                "wide",
                CandidateQuery::any_of(primary_narrow)
                    .and_any_of(adjacent_narrow)
                    .published_since(year - ladder.wide_years)
                    .limit(ladder.results_per_rung),
            ),
            Rung::new(
                "all_keywords",
                CandidateQuery::any_of(primary_all)
                    .and_any_of(adjacent_all.clone())
                    .limit(ladder.results_per_rung),
            ),
            Rung::new(
                "adjacent_only",
                CandidateQuery::any_of(adjacent_all).limit(ladder.results_per_rung),
            ),
        ]
    }

    fn score(
        &self,
        paper: &SourcePaper,
        rung: &Rung,
        profile: &UserProfile,
        _ctx: &GenerationContext,
    ) -> Option<Scored> {
        let (primary, adjacent) = Self::domains(profile)?;
        let text = paper.search_text();
        let primary_hits = count_keyword_hits(&primary, &text);
        let adjacent_hits = count_keyword_hits(&adjacent, &text);

        let mut score = cross_pollination_score(primary_hits, adjacent_hits);
        if score == 0.0 && rung.requires_all_groups() {
            score = SOURCE_ENFORCED_SCORE;
        }
        if score == 0.0 {
            return None;
        }
        Some(Scored::new(
            score,
            format!(
                "Bridges {} with {}",
                display_domain(&primary),
                display_domain(&adjacent)
            ),
        ))
    }
}
