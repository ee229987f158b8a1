use paperwise_core::{CandidateQuery, RecommendationCategory, SortBy, SourcePaper, UserProfile};

use super::{CategoryGenerator, GenerationContext, Scored};
use crate::ladder::Rung;
use crate::scoring::{months_since_publication, trending_score};

/// Recent papers in the user's field gaining citations quickly.
pub struct TrendingGenerator;

impl CategoryGenerator for TrendingGenerator {
    fn category(&self) -> RecommendationCategory {
        RecommendationCategory::Trending
    }

    fn rungs(&self, profile: &UserProfile, ctx: &GenerationContext) -> Vec<Rung> {
        let ladder = &ctx.config.ladder;
        let domains = ctx.query_domains(profile);
        let narrow = ctx.expand_terms(domains, Some(ladder.keywords_per_domain));
        let broad = ctx.expand_terms(domains, None);
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
                "recent_broad",
                CandidateQuery::any_of(broad.clone())
                    .published_since(year - ladder.recent_years)
                    .sorted_by(SortBy::Date)
                    .limit(ladder.results_per_rung),
            ),
            Rung::new(
                "wide",
                CandidateQuery::any_of(broad.clone())
                    .published_since(year - ladder.wide_years)
                    .limit(ladder.results_per_rung),
            ),
            Rung::new(
                "any_date",
                CandidateQuery::any_of(narrow).limit(ladder.results_per_rung),
            ),
        ]
    }

    fn score(
        &self,
        paper: &SourcePaper,
        _rung: &Rung,
        _profile: &UserProfile,
        ctx: &GenerationContext,
    ) -> Option<Scored> {
        let months = months_since_publication(paper.year, ctx.today);
        let score = trending_score(paper.citation_count, months);
        let reason = match paper.citation_count {
            0 => format!("Published {} months ago and gaining attention", months),
            1 => format!("1 citation in about {} months", months),
            n => format!("{} citations in about {} months", n, months),
        };
        Some(Scored::new(score, reason))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exclusion::ExclusionSet;
    use crate::generators::test_context::{context, nephrology_profile};
    use crate::test_support::{paper, CatalogSource};

    #[tokio::test]
    async fn test_recent_velocity_outranks_old_volume() {
        let ctx = context(CatalogSource::new(vec![
            paper("OLD", "Renal physiology classic", 2018, 400),
            paper("NEW", "Kidney biomarker discovery", 2025, 6),
            paper("MID", "Kidney transplant registry", 2023, 20),
        ]));
        let (papers, _) = TrendingGenerator
            .generate(&nephrology_profile(), ExclusionSet::new(), &ctx)
            .await;

        let ids: Vec<&str> = papers.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids.first(), Some(&"NEW"));
        assert!(ids.contains(&"OLD"));
        assert!(papers.windows(2).all(|w| w[0].score >= w[1].score));
        assert!(papers[0].reason.contains("6 citations"));
    }

    #[test]
    fn test_rungs_keep_recency_first() {
        let ctx = context(CatalogSource::default());
        let rungs = TrendingGenerator.rungs(&nephrology_profile(), &ctx);
        assert_eq!(rungs[0].query.sort_by, SortBy::Date);
        assert_eq!(rungs[0].query.published_after, Some(2023));
        assert_eq!(rungs.last().unwrap().query.published_after, None);
    }
}
