//! Shared research-domain vocabulary.
//!
//! The same keyword table drives profile inference ("which domain is this
//! user in") and query expansion ("which terms do we search for"), so both
//! sides always agree on what a domain means.
//!
//! Matching is case-insensitive and anchored at a word start: `renal`
//! matches "renal" and "renally" but not "adrenal".

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;

/// Domain → keywords. The first keywords are the most specific.
pub const DOMAIN_KEYWORDS: &[(&str, &[&str])] = &[
    (
        "nephrology",
        &["kidney", "renal", "nephrology", "nephropathy", "dialysis", "glomerul"],
    ),
    (
        "cardiology",
        &["cardiac", "heart", "cardiology", "cardiovascular", "myocardial", "arrhythmia"],
    ),
    (
        "oncology",
        &["cancer", "tumor", "tumour", "oncology", "carcinoma", "chemotherapy"],
    ),
    (
        "neurology",
        &["neurolog", "brain", "stroke", "epilepsy", "dementia", "neurodegenerat"],
    ),
    (
        "pharmacology",
        &["drug", "pharmacolog", "pharmacokinetic", "dosing", "medication", "adverse event"],
    ),
    (
        "immunology",
        &["immune", "immunolog", "antibod", "autoimmun", "inflammat", "cytokine"],
    ),
    (
        "endocrinology",
        &["diabetes", "insulin", "endocrin", "thyroid", "hormone", "metabolic"],
    ),
    (
        "infectious_disease",
        &["infection", "infectious", "viral", "bacterial", "sepsis", "antimicrobial"],
    ),
    (
        "genetics",
        &["genome", "genetic", "genomic", "sequencing", "mutation", "polymorphism"],
    ),
    (
        "epidemiology",
        &["epidemiolog", "cohort", "incidence", "prevalence", "population-based", "risk factor"],
    ),
    (
        "pulmonology",
        &["lung", "pulmonary", "respiratory", "asthma", "copd", "ventilat"],
    ),
    (
        "gastroenterology",
        &["gastro", "liver", "hepat", "bowel", "colitis", "intestin"],
    ),
    (
        "psychiatry",
        &["psychiatr", "depression", "anxiety", "schizophren", "mental health", "bipolar"],
    ),
    (
        "machine_learning",
        &["machine learning", "deep learning", "neural network", "artificial intelligence", "prediction model", "classifier"],
    ),
    (
        "public_health",
        &["public health", "health policy", "screening", "vaccination", "health equity", "prevention"],
    ),
];

/// Domain → adjacent domains used for cross-pollination, closest first.
pub const ADJACENT_DOMAINS: &[(&str, &[&str])] = &[
    ("nephrology", &["pharmacology", "cardiology", "endocrinology"]),
    ("cardiology", &["nephrology", "endocrinology", "pharmacology"]),
    ("oncology", &["immunology", "genetics", "pharmacology"]),
    ("neurology", &["psychiatry", "genetics", "machine_learning"]),
    ("pharmacology", &["nephrology", "oncology", "genetics"]),
    ("immunology", &["infectious_disease", "oncology", "genetics"]),
    ("endocrinology", &["cardiology", "nephrology", "gastroenterology"]),
    ("infectious_disease", &["immunology", "epidemiology", "public_health"]),
    ("genetics", &["oncology", "machine_learning", "immunology"]),
    ("epidemiology", &["public_health", "infectious_disease", "machine_learning"]),
    ("pulmonology", &["infectious_disease", "cardiology", "immunology"]),
    ("gastroenterology", &["endocrinology", "immunology", "oncology"]),
    ("psychiatry", &["neurology", "public_health", "pharmacology"]),
    ("machine_learning", &["genetics", "epidemiology", "neurology"]),
    ("public_health", &["epidemiology", "infectious_disease", "psychiatry"]),
];

/// Adjacent domains for a domain outside the vocabulary.
pub const GENERIC_ADJACENT_DOMAINS: &[&str] = &["epidemiology", "machine_learning"];

static DOMAIN_PATTERNS: Lazy<HashMap<&'static str, Regex>> = Lazy::new(|| {
    DOMAIN_KEYWORDS
        .iter()
        .map(|(domain, keywords)| (*domain, keyword_pattern(keywords.iter().copied())))
        .collect()
});

/// A domain and how many keyword occurrences matched it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainMatch {
    pub domain: String,
    pub hits: usize,
}

fn keyword_pattern<'a>(keywords: impl Iterator<Item = &'a str>) -> Regex {
    let alternatives: Vec<String> = keywords.map(regex::escape).collect();
    Regex::new(&format!(r"(?i)\b(?:{})", alternatives.join("|")))
        .expect("escaped keyword pattern")
}

/// Normalise a free-text domain label to the table's form.
pub fn canonical_domain(domain: &str) -> String {
    domain
        .trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
}

/// Whether the domain is part of the fixed vocabulary.
pub fn is_known_domain(domain: &str) -> bool {
    let canonical = canonical_domain(domain);
    DOMAIN_KEYWORDS.iter().any(|(d, _)| *d == canonical)
}

/// Query keywords for a domain.
///
/// A domain outside the vocabulary (e.g. a free-text subject area) is its
/// own sole keyword.
pub fn keywords_for(domain: &str) -> Vec<String> {
    let canonical = canonical_domain(domain);
    DOMAIN_KEYWORDS
        .iter()
        .find(|(d, _)| *d == canonical)
        .map(|(_, kws)| kws.iter().map(|k| k.to_string()).collect())
        .unwrap_or_else(|| {
            let label = domain.trim().to_lowercase().replace('_', " ");
            if label.is_empty() {
                Vec::new()
            } else {
                vec![label]
            }
        })
}

/// Count keyword occurrences of a domain in a text.
pub fn count_keyword_hits(domain: &str, text: &str) -> usize {
    let canonical = canonical_domain(domain);
    match DOMAIN_PATTERNS.get(canonical.as_str()) {
        Some(re) => re.find_iter(text).count(),
        None => {
            let keywords = keywords_for(domain);
            if keywords.is_empty() {
                return 0;
            }
            keyword_pattern(keywords.iter().map(String::as_str))
                .find_iter(text)
                .count()
        }
    }
}

/// Infer vocabulary domains from a set of texts.
///
/// Every domain with at least one keyword hit is returned, ordered by hit
/// count (descending) then name.
pub fn infer_domains<I, S>(texts: I) -> Vec<DomainMatch>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut counts: HashMap<&'static str, usize> = HashMap::new();
    for text in texts {
        let text = text.as_ref();
        for (domain, re) in DOMAIN_PATTERNS.iter() {
            let hits = re.find_iter(text).count();
            if hits > 0 {
                *counts.entry(*domain).or_default() += hits;
            }
        }
    }

    let mut matches: Vec<DomainMatch> = counts
        .into_iter()
        .map(|(domain, hits)| DomainMatch {
            domain: domain.to_string(),
            hits,
        })
        .collect();
    matches.sort_by(|a, b| b.hits.cmp(&a.hits).then_with(|| a.domain.cmp(&b.domain)));
    matches
}

/// Adjacent domains for cross-pollination, closest first.
pub fn adjacent_domains(domain: &str) -> Vec<String> {
    let canonical = canonical_domain(domain);
    ADJACENT_DOMAINS
        .iter()
        .find(|(d, _)| *d == canonical)
        .map(|(_, adj)| adj.iter().map(|a| a.to_string()).collect())
        .unwrap_or_else(|| {
            GENERIC_ADJACENT_DOMAINS
                .iter()
                .filter(|a| **a != canonical)
                .map(|a| a.to_string())
                .collect()
        })
}
