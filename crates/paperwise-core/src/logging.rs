//! Structured logging field names for paperwise.
//!
//! All crates use these constants for consistent structured logging fields,
//! e.g. `info!({ logging::CATEGORY } = %category, "...")`.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Degraded service, requires operator attention |
//! | WARN  | Recoverable issue, automatic fallback applied |
//! | INFO  | Lifecycle events, request completions |
//! | DEBUG | Decision points (profile rung, ladder rung, cache hit/miss) |
//! | TRACE | Per-candidate iteration |

// ─── Identity fields ───────────────────────────────────────────────────────

/// Subsystem originating the log event.
/// Values: "api", "recommend", "db", "sources", "inference"
pub const SUBSYSTEM: &str = "subsystem";

/// Component within a subsystem.
/// Examples: "orchestrator", "profile_builder", "ladder", "pubmed"
pub const COMPONENT: &str = "component";

/// Logical operation name.
pub const OPERATION: &str = "op";

// ─── Entity fields ─────────────────────────────────────────────────────────

/// User UUID the recommendations are computed for.
pub const USER_ID: &str = "user_id";

/// Project UUID, or "global".
pub const PROJECT_ID: &str = "project_id";

/// Recommendation category.
pub const CATEGORY: &str = "category";

/// Profile signal source that produced the domains.
pub const SIGNAL_SOURCE: &str = "signal_source";

/// Source query text.
pub const QUERY: &str = "query";

/// Zero-based ladder rung index.
pub const RUNG: &str = "rung";

// ─── Measurement fields ────────────────────────────────────────────────────

/// Wall-clock duration in milliseconds.
pub const DURATION_MS: &str = "duration_ms";

/// Number of results returned by a query or stage.
pub const RESULT_COUNT: &str = "result_count";

/// Number of backfilled duplicates inserted.
pub const BACKFILL_COUNT: &str = "backfill_count";

// ─── Outcome fields ────────────────────────────────────────────────────────

/// Whether the cache served the request.
pub const CACHE_HIT: &str = "cache_hit";

/// Error message when an operation fails.
pub const ERROR_MSG: &str = "error";
