//! Recommendation engine configuration.
//!
//! Every threshold of the engine is tunable. Configuration is resolved as:
//! 1. Defaults from `paperwise_core::defaults`
//! 2. TOML file named by `PAPERWISE_CONFIG` (optional)
//! 3. `PAPERWISE_*` environment variables
//!
//! # Example
//!
//! ```rust,no_run
//! use paperwise_recommend::config::RecommendationConfig;
//!
//! let config = RecommendationConfig::load().expect("invalid configuration");
//! assert!(config.min_papers_per_section > 0);
//! ```

use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use paperwise_core::defaults;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

/// Environment variable naming an optional TOML configuration file.
pub const CONFIG_PATH_ENV: &str = "PAPERWISE_CONFIG";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },

    #[error("Validation error: {0}")]
    Validation(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Query widths of the broadening ladder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LadderConfig {
    /// Publication window of the narrowest rung, in years
    pub recent_years: i32,
    /// Publication window of the wider rung, in years
    pub wide_years: i32,
    /// Results requested per rung
    pub results_per_rung: usize,
    /// Keywords per domain on the narrow rungs
    pub keywords_per_domain: usize,
}

impl Default for LadderConfig {
    fn default() -> Self {
        Self {
            recent_years: defaults::LADDER_RECENT_YEARS,
            wide_years: defaults::LADDER_WIDE_YEARS,
            results_per_rung: defaults::LADDER_RESULTS_PER_RUNG,
            keywords_per_domain: defaults::KEYWORDS_PER_DOMAIN,
        }
    }
}

/// Tunables of the recommendation engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecommendationConfig {
    /// Minimum section size guaranteed by backfill
    pub min_papers_per_section: usize,
    /// Papers each generator keeps
    pub section_target_size: usize,
    /// Whether marked duplicates may top up small sections
    pub enable_backfill: bool,
    /// Domains kept on a profile
    pub profile_domain_limit: usize,
    /// Profile domains a generator expands into query terms
    pub generator_domain_count: usize,
    pub ladder: LadderConfig,
    /// Citation count at which a paper stops being a citation opportunity
    pub citation_ceiling: u32,
    /// Maximum age of a citation opportunity, in years
    pub citation_max_age_years: i32,
    pub cache_ttl_secs: u64,
    /// Semantic annotation calls in flight
    pub annotation_concurrency: usize,
    /// Deadline for a whole request
    pub request_deadline_secs: u64,
}

impl Default for RecommendationConfig {
    fn default() -> Self {
        Self {
            min_papers_per_section: defaults::MIN_PAPERS_PER_SECTION,
            section_target_size: defaults::SECTION_TARGET_SIZE,
            enable_backfill: true,
            profile_domain_limit: defaults::PROFILE_DOMAIN_LIMIT,
            generator_domain_count: defaults::GENERATOR_DOMAIN_COUNT,
            ladder: LadderConfig::default(),
            citation_ceiling: defaults::CITATION_OPPORTUNITY_CEILING,
            citation_max_age_years: defaults::CITATION_OPPORTUNITY_MAX_AGE_YEARS,
            cache_ttl_secs: defaults::CACHE_TTL_SECS,
            annotation_concurrency: defaults::ANNOTATION_CONCURRENCY,
            request_deadline_secs: defaults::REQUEST_DEADLINE_SECS,
        }
    }
}

impl RecommendationConfig {
    /// Load from `PAPERWISE_CONFIG` (if set), then apply environment overrides.
    pub fn load() -> ConfigResult<Self> {
        let mut config = match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) if !path.trim().is_empty() => Self::from_file(Path::new(&path))?,
            _ => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        info!(
            min_papers_per_section = config.min_papers_per_section,
            section_target_size = config.section_target_size,
            cache_ttl_secs = config.cache_ttl_secs,
            "Recommendation config loaded"
        );
        Ok(config)
    }

    /// Parse a TOML file. Missing keys take their defaults.
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        debug!(path = %path.display(), "Reading recommendation config");
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> ConfigResult<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Apply `PAPERWISE_*` overrides using the given lookup.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> ConfigResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        fn parse<T: FromStr>(key: &str, value: String) -> ConfigResult<T> {
            value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue {
                    key: key.to_string(),
                    value,
                })
        }

        macro_rules! override_field {
            ($key:expr, $field:expr) => {
                if let Some(value) = lookup($key) {
                    $field = parse($key, value)?;
                }
            };
        }

        override_field!("PAPERWISE_MIN_PAPERS_PER_SECTION", self.min_papers_per_section);
        override_field!("PAPERWISE_SECTION_TARGET_SIZE", self.section_target_size);
        override_field!("PAPERWISE_ENABLE_BACKFILL", self.enable_backfill);
        override_field!("PAPERWISE_PROFILE_DOMAIN_LIMIT", self.profile_domain_limit);
        override_field!("PAPERWISE_GENERATOR_DOMAIN_COUNT", self.generator_domain_count);
        override_field!("PAPERWISE_LADDER_RECENT_YEARS", self.ladder.recent_years);
        override_field!("PAPERWISE_LADDER_WIDE_YEARS", self.ladder.wide_years);
        override_field!("PAPERWISE_LADDER_RESULTS_PER_RUNG", self.ladder.results_per_rung);
        override_field!("PAPERWISE_CITATION_CEILING", self.citation_ceiling);
        override_field!("PAPERWISE_CITATION_MAX_AGE_YEARS", self.citation_max_age_years);
        override_field!("PAPERWISE_CACHE_TTL_SECS", self.cache_ttl_secs);
        override_field!("PAPERWISE_ANNOTATION_CONCURRENCY", self.annotation_concurrency);
        override_field!("PAPERWISE_REQUEST_DEADLINE_SECS", self.request_deadline_secs);
        Ok(())
    }

    /// Reject configurations the engine cannot honour.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.min_papers_per_section == 0 {
            return Err(ConfigError::Validation(
                "min_papers_per_section must be greater than 0".to_string(),
            ));
        }
        if self.section_target_size < self.min_papers_per_section {
            return Err(ConfigError::Validation(format!(
                "section_target_size ({}) must be at least min_papers_per_section ({})",
                self.section_target_size, self.min_papers_per_section
            )));
        }
        if self.section_target_size > defaults::SECTION_TARGET_MAX {
            return Err(ConfigError::Validation(format!(
                "section_target_size must be at most {}",
                defaults::SECTION_TARGET_MAX
            )));
        }
        if self.profile_domain_limit == 0 || self.generator_domain_count == 0 {
            return Err(ConfigError::Validation(
                "profile_domain_limit and generator_domain_count must be greater than 0"
                    .to_string(),
            ));
        }
        if self.ladder.recent_years <= 0 || self.ladder.recent_years >= self.ladder.wide_years {
            return Err(ConfigError::Validation(format!(
                "ladder windows must satisfy 0 < recent_years ({}) < wide_years ({})",
                self.ladder.recent_years, self.ladder.wide_years
            )));
        }
        if self.ladder.results_per_rung == 0 || self.ladder.keywords_per_domain == 0 {
            return Err(ConfigError::Validation(
                "ladder results_per_rung and keywords_per_domain must be greater than 0"
                    .to_string(),
            ));
        }
        if self.citation_ceiling == 0 || self.citation_max_age_years <= 0 {
            return Err(ConfigError::Validation(
                "citation_ceiling and citation_max_age_years must be greater than 0".to_string(),
            ));
        }
        if self.cache_ttl_secs == 0 {
            return Err(ConfigError::Validation(
                "cache_ttl_secs must be greater than 0".to_string(),
            ));
        }
        if self.annotation_concurrency == 0 {
            return Err(ConfigError::Validation(
                "annotation_concurrency must be greater than 0".to_string(),
            ));
        }
        if self.request_deadline_secs == 0 {
            return Err(ConfigError::Validation(
                "request_deadline_secs must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn request_deadline(&self) -> Duration {
        Duration::from_secs(self.request_deadline_secs)
    }
}
