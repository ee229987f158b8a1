//! Centralized default constants for paperwise.
//!
//! **This module is the single source of truth** for shared default values.
//! Runtime-tunable values are copied into `RecommendationConfig` (in
//! `paperwise-recommend`) which may override them from TOML or environment.
//!
//! Organized by domain area. When adding new constants, place them in the
//! appropriate section.

// =============================================================================
// SECTIONS
// =============================================================================

/// Minimum number of papers a category should show after deduplication.
/// Sections below this are topped up with marked backfill duplicates.
pub const MIN_PAPERS_PER_SECTION: usize = 8;

/// Number of papers a generator keeps for its category.
pub const SECTION_TARGET_SIZE: usize = 12;

/// Upper bound accepted for a configured section target.
pub const SECTION_TARGET_MAX: usize = 50;

// =============================================================================
// PROFILE
// =============================================================================

/// Maximum number of primary domains kept on a profile.
pub const PROFILE_DOMAIN_LIMIT: usize = 3;

/// Domains used when a user has no signals at all.
pub const GENERIC_DEFAULT_DOMAINS: &[&str] = &["public_health", "epidemiology", "genetics"];

/// Saved-item count at which a user counts as "active".
pub const ACTIVE_USER_MIN_ITEMS: usize = 10;

/// Confidence band for domains inferred from saved items.
pub const EXPLICIT_ACTIVITY_CONFIDENCE: (f32, f32) = (0.80, 0.95);

/// Confidence band for domains inferred from collection names.
pub const COLLECTION_INFERENCE_CONFIDENCE: (f32, f32) = (0.60, 0.75);

/// Confidence for a registered subject area.
pub const SUBJECT_AREA_CONFIDENCE: f32 = 0.50;

/// Confidence for the generic default domains.
pub const GENERIC_DEFAULT_CONFIDENCE: f32 = 0.30;

// =============================================================================
// BROADENING LADDER
// =============================================================================

/// Publication window (years) of the narrowest ladder rung.
pub const LADDER_RECENT_YEARS: i32 = 2;

/// Publication window (years) of the wider ladder rung.
pub const LADDER_WIDE_YEARS: i32 = 5;

/// Results requested from the source per rung.
pub const LADDER_RESULTS_PER_RUNG: usize = 40;

/// Number of profile domains a generator expands into query terms.
pub const GENERATOR_DOMAIN_COUNT: usize = 3;

/// Keywords per domain used on the narrow rungs.
pub const KEYWORDS_PER_DOMAIN: usize = 3;

// =============================================================================
// CITATION OPPORTUNITIES
// =============================================================================

/// Papers at or above this citation count are not citation opportunities.
pub const CITATION_OPPORTUNITY_CEILING: u32 = 10;

/// Maximum age in years of a citation opportunity.
pub const CITATION_OPPORTUNITY_MAX_AGE_YEARS: i32 = 4;

// =============================================================================
// CACHE
// =============================================================================

/// Freshness window of a cached recommendation set (6 hours).
pub const CACHE_TTL_SECS: u64 = 6 * 60 * 60;

/// Redis key prefix for cached recommendation sets.
pub const CACHE_KEY_PREFIX: &str = "pw:weekly:";

/// Scope label used in cache keys when no project is given.
pub const GLOBAL_SCOPE: &str = "global";

// =============================================================================
// ENRICHMENT
// =============================================================================

/// Maximum semantic annotation calls in flight.
pub const ANNOTATION_CONCURRENCY: usize = 5;

/// Default deadline for a whole recommendation request in seconds.
pub const REQUEST_DEADLINE_SECS: u64 = 30;

// =============================================================================
// SOURCES
// =============================================================================

/// Default NCBI E-utilities base URL.
pub const PUBMED_URL: &str = "https://eutils.ncbi.nlm.nih.gov/entrez/eutils";

/// Timeout for a single PubMed request in seconds.
pub const PUBMED_TIMEOUT_SECS: u64 = 15;

/// Tool name reported to NCBI.
pub const PUBMED_TOOL: &str = "paperwise";

// =============================================================================
// INFERENCE
// =============================================================================

/// Default Ollama base URL.
pub const OLLAMA_URL: &str = "http://127.0.0.1:11434";

/// Default generation model name (Ollama).
pub const GEN_MODEL: &str = "qwen2.5:7b";

/// Timeout for generation requests in seconds.
pub const GEN_TIMEOUT_SECS: u64 = 60;

// =============================================================================
// SERVER
// =============================================================================

/// Default HTTP server port.
pub const SERVER_PORT: u16 = 3000;
