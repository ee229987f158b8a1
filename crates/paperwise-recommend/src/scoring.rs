//! Scoring functions shared by the category generators.
//!
//! All functions are pure; the generators decide which papers are eligible
//! and how scores are explained.

use chrono::{Datelike, NaiveDate};
use paperwise_core::domains::count_keyword_hits;
use paperwise_core::UserProfile;

/// Publication month assumed when only the year is known.
const ASSUMED_PUBLICATION_MONTH: i32 = 6;

/// Months between an estimated mid-year publication date and `today`.
///
/// Never less than one, so velocities stay finite for papers of the
/// current year.
pub fn months_since_publication(year: i32, today: NaiveDate) -> u32 {
    let months = (today.year() - year) * 12 + (today.month() as i32 - ASSUMED_PUBLICATION_MONTH);
    months.max(1) as u32
}

/// Whole years between publication and `today`.
pub fn age_in_years(year: i32, today: NaiveDate) -> i32 {
    (today.year() - year).max(0)
}

/// Weighted keyword strength of a text against the given profile domains.
///
/// Each domain contributes `confidence * ln(1 + hits)`; domains without
/// hits contribute nothing.
pub fn domain_match_strength(profile: &UserProfile, domains: &[String], text: &str) -> f32 {
    domains
        .iter()
        .map(|d| {
            let hits = count_keyword_hits(d, text);
            if hits == 0 {
                0.0
            } else {
                profile.confidence(d).max(0.1) * (1.0 + hits as f32).ln()
            }
        })
        .sum()
}

/// The profile domain with the most keyword hits in a text.
pub fn best_matching_domain<'a>(domains: &'a [String], text: &str) -> Option<&'a str> {
    domains
        .iter()
        .map(|d| (d, count_keyword_hits(d, text)))
        .filter(|(_, hits)| *hits > 0)
        .max_by(|a, b| a.1.cmp(&b.1).then_with(|| b.0.cmp(a.0)))
        .map(|(d, _)| d.as_str())
}

/// Recency-weighted citation velocity.
///
/// Velocity is citations per month since publication; the recency factor
/// `1 / (1 + months / 12)` both scales the velocity and is added on its own,
/// so a young paper with a handful of citations outranks an old paper with
/// a large but slowly accumulated count.
pub fn trending_score(citation_count: u32, months: u32) -> f32 {
    let months = months.max(1) as f32;
    let velocity = citation_count as f32 / months;
    let recency = 1.0 / (1.0 + months / 12.0);
    (1.0 + velocity).ln() * (1.0 + recency) + recency
}

/// Score for a paper mentioning both a primary and an adjacent domain.
///
/// Zero unless both sides have at least one hit. Balanced coverage of both
/// domains scores higher than many hits on a single side.
pub fn cross_pollination_score(primary_hits: usize, adjacent_hits: usize) -> f32 {
    if primary_hits == 0 || adjacent_hits == 0 {
        return 0.0;
    }
    let balanced = primary_hits.min(adjacent_hits) as f32;
    let total = (primary_hits + adjacent_hits) as f32;
    (1.0 + balanced).ln() + 0.25 * total.ln()
}

/// Score for a recent, little-cited paper.
///
/// Zero when the paper is at or above the citation ceiling or older than
/// `max_age_years`. Fewer citations, younger age and a stronger domain
/// match all raise the score.
pub fn citation_opportunity_score(
    citation_count: u32,
    age_years: i32,
    ceiling: u32,
    max_age_years: i32,
    domain_strength: f32,
) -> f32 {
    if citation_count >= ceiling || age_years > max_age_years || ceiling == 0 {
        return 0.0;
    }
    let scarcity = 1.0 - citation_count as f32 / ceiling as f32;
    let freshness = 1.0 - age_years as f32 / (max_age_years + 1) as f32;
    0.1 + 0.5 * scarcity + 0.3 * freshness + 0.2 * domain_strength.min(2.0)
}
