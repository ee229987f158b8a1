//! Core data models for paperwise.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::defaults;
use crate::error::{Error, Result};

// =============================================================================
// CATEGORY TYPES
// =============================================================================

/// Recommendation category.
///
/// Variants are declared in priority order; the derived `Ord` is that order,
/// so a `BTreeMap` keyed by category iterates highest priority first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationCategory {
    /// Papers matching the user's own domains
    PapersForYou,
    /// Recent papers gaining citations quickly
    Trending,
    /// Papers bridging the user's domain with an adjacent one
    CrossPollination,
    /// Recent, little-cited papers in the user's domain
    CitationOpportunities,
}

impl RecommendationCategory {
    /// All categories in fixed priority order.
    pub const ALL: [RecommendationCategory; 4] = [
        Self::PapersForYou,
        Self::Trending,
        Self::CrossPollination,
        Self::CitationOpportunities,
    ];

    /// Zero-based priority (0 = highest).
    pub fn priority(&self) -> usize {
        match self {
            Self::PapersForYou => 0,
            Self::Trending => 1,
            Self::CrossPollination => 2,
            Self::CitationOpportunities => 3,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PapersForYou => "papers_for_you",
            Self::Trending => "trending",
            Self::CrossPollination => "cross_pollination",
            Self::CitationOpportunities => "citation_opportunities",
        }
    }
}

impl std::fmt::Display for RecommendationCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RecommendationCategory {
    type Err = String;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "papers_for_you" => Ok(Self::PapersForYou),
            "trending" | "trending_in_field" => Ok(Self::Trending),
            "cross_pollination" => Ok(Self::CrossPollination),
            "citation_opportunities" | "citation_opportunity" => Ok(Self::CitationOpportunities),
            _ => Err(format!("Invalid recommendation category: {}", s)),
        }
    }
}

// =============================================================================
// PROFILE TYPES
// =============================================================================

/// Which signal produced a profile's domains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalSource {
    /// Papers the user saved
    ExplicitActivity,
    /// Names and descriptions of the user's collections
    CollectionInference,
    /// Registered subject area
    SubjectArea,
    /// Fixed fallback for users without any signal
    GenericDefault,
}

impl std::fmt::Display for SignalSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ExplicitActivity => write!(f, "explicit_activity"),
            Self::CollectionInference => write!(f, "collection_inference"),
            Self::SubjectArea => write!(f, "subject_area"),
            Self::GenericDefault => write!(f, "generic_default"),
        }
    }
}

/// Coarse activity level of a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityLevel {
    New,
    Moderate,
    Active,
}

impl ActivityLevel {
    /// Derive the activity level from the number of saved items.
    pub fn from_saved_count(count: usize) -> Self {
        if count == 0 {
            Self::New
        } else if count < defaults::ACTIVE_USER_MIN_ITEMS {
            Self::Moderate
        } else {
            Self::Active
        }
    }
}

/// Personalization profile built once per recommendation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Domains, most confident first
    pub primary_domains: Vec<String>,
    /// Confidence per domain in [0, 1]
    pub domain_confidence: HashMap<String, f32>,
    pub signal_source: SignalSource,
    pub activity_level: ActivityLevel,
}

impl UserProfile {
    /// Confidence for a domain (0.0 when the domain is not on the profile).
    pub fn confidence(&self, domain: &str) -> f32 {
        self.domain_confidence.get(domain).copied().unwrap_or(0.0)
    }

    /// The first `n` domains.
    pub fn top_domains(&self, n: usize) -> &[String] {
        &self.primary_domains[..n.min(self.primary_domains.len())]
    }

    /// The most confident domain, if any.
    pub fn primary_domain(&self) -> Option<&str> {
        self.primary_domains.first().map(String::as_str)
    }
}

/// A paper the user saved, as read from the signal store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedItem {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
}

impl SavedItem {
    /// Text scanned for domain keywords.
    pub fn signal_text(&self) -> String {
        match &self.description {
            Some(d) => format!("{} {}", self.title, d),
            None => self.title.clone(),
        }
    }
}

/// A collection owned by the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionSummary {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
}

impl CollectionSummary {
    /// Text scanned for domain keywords.
    pub fn signal_text(&self) -> String {
        match &self.description {
            Some(d) => format!("{} {}", self.name, d),
            None => self.name.clone(),
        }
    }
}

// =============================================================================
// SOURCE TYPES
// =============================================================================

/// Sort order requested from a candidate source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortBy {
    #[default]
    Relevance,
    Date,
}

/// Structured query issued to a candidate source.
///
/// Term groups are ANDed together; terms inside a group are ORed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateQuery {
    pub groups: Vec<Vec<String>>,
    /// Earliest publication year (inclusive)
    pub published_after: Option<i32>,
    pub max_results: usize,
    pub sort_by: SortBy,
}

impl CandidateQuery {
    /// Query matching any of the given terms.
    pub fn any_of<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            groups: vec![terms.into_iter().map(Into::into).collect()],
            published_after: None,
            max_results: defaults::LADDER_RESULTS_PER_RUNG,
            sort_by: SortBy::Relevance,
        }
    }

    /// Additionally require one of the given terms.
    pub fn and_any_of<I, S>(mut self, terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.groups.push(terms.into_iter().map(Into::into).collect());
        self
    }

    /// Restrict to papers published in or after `year`.
    pub fn published_since(mut self, year: i32) -> Self {
        self.published_after = Some(year);
        self
    }

    pub fn sorted_by(mut self, sort_by: SortBy) -> Self {
        self.sort_by = sort_by;
        self
    }

    pub fn limit(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }

    /// True when no group carries a term.
    pub fn is_empty(&self) -> bool {
        self.groups.iter().all(|g| g.is_empty())
    }

    /// Render as a bibliographic search string, e.g.
    /// `(kidney[tiab] OR renal[tiab]) AND 2023:3000[dp]`.
    pub fn to_query_string(&self) -> String {
        let mut clauses: Vec<String> = self
            .groups
            .iter()
            .filter(|g| !g.is_empty())
            .map(|group| {
                let terms: Vec<String> = group
                    .iter()
                    .map(|t| {
                        if t.contains(' ') {
                            format!("\"{}\"[tiab]", t)
                        } else {
                            format!("{}[tiab]", t)
                        }
                    })
                    .collect();
                format!("({})", terms.join(" OR "))
            })
            .collect();

        if let Some(year) = self.published_after {
            clauses.push(format!("{}:3000[dp]", year));
        }

        clauses.join(" AND ")
    }
}

/// Loosely shaped record as parsed from an upstream source.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawPaperRecord {
    pub id: Option<String>,
    pub title: Option<String>,
    #[serde(default)]
    pub authors: Vec<String>,
    pub year: Option<i32>,
    pub citation_count: Option<i64>,
    pub journal: Option<String>,
    pub abstract_text: Option<String>,
}

impl RawPaperRecord {
    /// Validate required fields and produce a typed record.
    ///
    /// Records without id, title or a plausible publication year are
    /// rejected. A missing citation count is read as zero.
    pub fn validate(self, current_year: i32) -> Result<SourcePaper> {
        let id = self
            .id
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| Error::MalformedRecord("missing id".to_string()))?;

        let title = self
            .title
            .map(|s| s.trim().trim_end_matches('.').trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| Error::MalformedRecord(format!("{}: missing title", id)))?;

        let year = self
            .year
            .ok_or_else(|| Error::MalformedRecord(format!("{}: missing year", id)))?;
        if !(1800..=current_year + 1).contains(&year) {
            return Err(Error::MalformedRecord(format!(
                "{}: implausible year {}",
                id, year
            )));
        }

        let citation_count = match self.citation_count {
            None => 0,
            Some(c) if c < 0 => {
                return Err(Error::MalformedRecord(format!(
                    "{}: negative citation count {}",
                    id, c
                )))
            }
            Some(c) => u32::try_from(c).unwrap_or(u32::MAX),
        };

        Ok(SourcePaper {
            id,
            title,
            authors: self
                .authors
                .into_iter()
                .map(|a| a.trim().to_string())
                .filter(|a| !a.is_empty())
                .collect(),
            year,
            citation_count,
            journal: self.journal.filter(|j| !j.trim().is_empty()),
            abstract_text: self.abstract_text.filter(|a| !a.trim().is_empty()),
        })
    }
}

/// Validated paper returned by a candidate source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourcePaper {
    pub id: String,
    pub title: String,
    pub authors: Vec<String>,
    pub year: i32,
    pub citation_count: u32,
    pub journal: Option<String>,
    pub abstract_text: Option<String>,
}

impl SourcePaper {
    /// Text scanned for domain keywords (title plus abstract when known).
    pub fn search_text(&self) -> String {
        match &self.abstract_text {
            Some(a) => format!("{} {}", self.title, a),
            None => self.title.clone(),
        }
    }

    /// Turn into a scored candidate for a category.
    pub fn into_candidate(
        self,
        category: RecommendationCategory,
        score: f32,
        reason: String,
    ) -> CandidatePaper {
        CandidatePaper {
            id: self.id,
            title: self.title,
            authors: self.authors,
            year: self.year,
            citation_count: self.citation_count,
            journal: self.journal,
            score,
            category,
            reason,
            is_backfill_duplicate: false,
            semantic_analysis: None,
        }
    }
}

// =============================================================================
// RECOMMENDATION TYPES
// =============================================================================

/// Additive metadata from the semantic annotator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SemanticAnalysis {
    pub methodology: String,
    pub complexity_score: f32,
    pub domains: Vec<String>,
    #[serde(default)]
    pub confidence_scores: HashMap<String, f32>,
}

/// A scored candidate in one category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidatePaper {
    pub id: String,
    pub title: String,
    pub authors: Vec<String>,
    pub year: i32,
    pub citation_count: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub journal: Option<String>,
    pub score: f32,
    pub category: RecommendationCategory,
    /// Human-readable justification
    pub reason: String,
    /// True when re-inserted by backfill although another category claimed it
    #[serde(default)]
    pub is_backfill_duplicate: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub semantic_analysis: Option<SemanticAnalysis>,
}

/// Score/reason adjustment returned by an LLM ranker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedPaper {
    pub id: String,
    pub score: f32,
    pub reason: String,
}

/// Final weekly recommendation result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationSet {
    /// Papers per category, each sorted by descending score
    pub categories: BTreeMap<RecommendationCategory, Vec<CandidatePaper>>,
    pub generated_at: DateTime<Utc>,
    pub profile_snapshot: UserProfile,
}

impl RecommendationSet {
    /// Papers of one category (empty when absent).
    pub fn papers(&self, category: RecommendationCategory) -> &[CandidatePaper] {
        self.categories
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn total_papers(&self) -> usize {
        self.categories.values().map(Vec::len).sum()
    }

    /// Whether any category holds the given paper id.
    pub fn contains(&self, paper_id: &str) -> bool {
        self.categories
            .values()
            .any(|papers| papers.iter().any(|p| p.id == paper_id))
    }

    /// Categories holding the given id as a non-backfilled entry.
    pub fn unique_owners(&self, paper_id: &str) -> Vec<RecommendationCategory> {
        self.categories
            .iter()
            .filter(|(_, papers)| {
                papers
                    .iter()
                    .any(|p| p.id == paper_id && !p.is_backfill_duplicate)
            })
            .map(|(c, _)| *c)
            .collect()
    }
}

// =============================================================================
// CACHE TYPES
// =============================================================================

/// Cache key: one entry per user and project (or global scope).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheKey {
    pub user_id: Uuid,
    pub project_id: Option<Uuid>,
}

impl CacheKey {
    pub fn new(user_id: Uuid, project_id: Option<Uuid>) -> Self {
        Self {
            user_id,
            project_id,
        }
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.project_id {
            Some(pid) => write!(f, "{}:{}", self.user_id, pid),
            None => write!(f, "{}:{}", self.user_id, defaults::GLOBAL_SCOPE),
        }
    }
}

/// A cached recommendation set with its expiry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub key: CacheKey,
    pub value: RecommendationSet,
    pub expires_at: DateTime<Utc>,
}

impl CacheEntry {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}
