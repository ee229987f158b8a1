//! PubMed E-utilities candidate source.
//!
//! A search is two requests: `esearch.fcgi` returns matching PMIDs, then
//! `esummary.fcgi` returns their document summaries. Summaries that fail
//! validation are dropped with a warning; only transport and HTTP failures
//! are errors.
//!
//! NCBI allows 3 requests/second without an API key and 10 with one.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::{Datelike, Utc};
use paperwise_core::{
    defaults, logging, CandidateQuery, CandidateSource, Error, RawPaperRecord, Result, SortBy,
    SourcePaper,
};
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

/// Connection settings for the E-utilities API.
#[derive(Debug, Clone)]
pub struct PubMedConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    /// Contact address sent with every request, as NCBI asks
    pub email: Option<String>,
    pub tool: String,
    pub timeout_secs: u64,
}

impl Default for PubMedConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::PUBMED_URL.to_string(),
            api_key: None,
            email: None,
            tool: defaults::PUBMED_TOOL.to_string(),
            timeout_secs: defaults::PUBMED_TIMEOUT_SECS,
        }
    }
}

impl PubMedConfig {
    /// Read `PUBMED_URL`, `PUBMED_API_KEY`, `PUBMED_EMAIL` and
    /// `PUBMED_TIMEOUT_SECS`; unset values keep their defaults.
    pub fn from_env() -> Self {
        let non_empty = |key: &str| std::env::var(key).ok().filter(|v| !v.trim().is_empty());
        let defaults = Self::default();
        Self {
            base_url: non_empty("PUBMED_URL").unwrap_or(defaults.base_url),
            api_key: non_empty("PUBMED_API_KEY"),
            email: non_empty("PUBMED_EMAIL"),
            tool: defaults.tool,
            timeout_secs: non_empty("PUBMED_TIMEOUT_SECS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.timeout_secs),
        }
    }
}

/// Candidate source backed by PubMed.
pub struct PubMedSource {
    client: Client,
    config: PubMedConfig,
}

impl PubMedSource {
    pub fn new(config: PubMedConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(format!("{}/{}", config.tool, env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        info!(
            url = %config.base_url,
            api_key = config.api_key.is_some(),
            "Initialized PubMed source"
        );
        Ok(Self { client, config })
    }

    pub fn from_env() -> Result<Self> {
        Self::new(PubMedConfig::from_env())
    }

    /// Parameters NCBI expects on every request.
    fn common_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("db", "pubmed".to_string()),
            ("retmode", "json".to_string()),
            ("tool", self.config.tool.clone()),
        ];
        if let Some(email) = &self.config.email {
            params.push(("email", email.clone()));
        }
        if let Some(key) = &self.config.api_key {
            params.push(("api_key", key.clone()));
        }
        params
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        endpoint: &str,
        params: Vec<(&'static str, String)>,
    ) -> Result<T> {
        let response = self
            .client
            .get(format!("{}/{}", self.config.base_url.trim_end_matches('/'), endpoint))
            .query(&params)
            .send()
            .await
            .map_err(|e| Error::Source(format!("{} request failed: {}", endpoint, e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Source(format!(
                "{} returned {}: {}",
                endpoint,
                status,
                body.chars().take(200).collect::<String>()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| Error::Source(format!("Failed to parse {} response: {}", endpoint, e)))
    }

    async fn search_pmids(&self, query: &CandidateQuery) -> Result<Vec<String>> {
        let mut params = self.common_params();
        params.push(("term", query.to_query_string()));
        params.push(("retmax", query.max_results.to_string()));
        params.push((
            "sort",
            match query.sort_by {
                SortBy::Relevance => "relevance",
                SortBy::Date => "pub_date",
            }
            .to_string(),
        ));

        let response: SearchResponse = self.get_json("esearch.fcgi", params).await?;
        Ok(response.esearchresult.idlist)
    }

    async fn fetch_summaries(&self, pmids: &[String]) -> Result<Vec<RawPaperRecord>> {
        let mut params = self.common_params();
        params.push(("id", pmids.join(",")));

        let response: SummaryResponse = self.get_json("esummary.fcgi", params).await?;
        Ok(parse_summaries(&response.result))
    }
}

#[async_trait]
impl CandidateSource for PubMedSource {
    fn name(&self) -> &str {
        "pubmed"
    }

    #[instrument(
        skip(self, query),
        fields(subsystem = "sources", component = "pubmed", op = "search", query = %query.to_query_string())
    )]
    async fn search(&self, query: &CandidateQuery) -> Result<Vec<SourcePaper>> {
        if query.is_empty() || query.max_results == 0 {
            return Ok(Vec::new());
        }
        let start = Instant::now();

        let pmids = self.search_pmids(query).await?;
        if pmids.is_empty() {
            debug!("esearch returned no ids");
            return Ok(Vec::new());
        }

        let records = self.fetch_summaries(&pmids).await?;
        let current_year = Utc::now().year();
        let mut papers = Vec::with_capacity(records.len());
        for record in records {
            match record.validate(current_year) {
                Ok(paper) => papers.push(paper),
                Err(e) => warn!({ logging::ERROR_MSG } = %e, "Dropping malformed PubMed record"),
            }
        }

        debug!(
            ids = pmids.len(),
            { logging::RESULT_COUNT } = papers.len(),
            { logging::DURATION_MS } = start.elapsed().as_millis() as u64,
            "PubMed search complete"
        );
        Ok(papers)
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    esearchresult: SearchResult,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    #[serde(default)]
    idlist: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct SummaryResponse {
    #[serde(default)]
    result: Value,
}

/// Turn an esummary `result` object into raw records, in `uids` order.
///
/// Fields are read leniently (NCBI sends `pmcrefcount` as a number or an
/// empty string); validation happens afterwards.
fn parse_summaries(result: &Value) -> Vec<RawPaperRecord> {
    let Some(uids) = result.get("uids").and_then(Value::as_array) else {
        return Vec::new();
    };

    uids.iter()
        .filter_map(Value::as_str)
        .filter_map(|uid| result.get(uid).map(|doc| (uid, doc)))
        .filter(|(_, doc)| doc.get("error").is_none())
        .map(|(uid, doc)| RawPaperRecord {
            id: Some(format!("PMID{}", uid)),
            title: doc.get("title").and_then(Value::as_str).map(str::to_string),
            authors: doc
                .get("authors")
                .and_then(Value::as_array)
                .map(|authors| {
                    authors
                        .iter()
                        .filter_map(|a| a.get("name").and_then(Value::as_str))
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default(),
            year: doc
                .get("pubdate")
                .and_then(Value::as_str)
                .and_then(leading_year)
                .or_else(|| doc.get("sortpubdate").and_then(Value::as_str).and_then(leading_year)),
            citation_count: doc.get("pmcrefcount").and_then(|v| match v {
                Value::Number(n) => n.as_i64(),
                Value::String(s) => s.trim().parse().ok(),
                _ => None,
            }),
            journal: doc
                .get("fulljournalname")
                .or_else(|| doc.get("source"))
                .and_then(Value::as_str)
                .map(str::to_string),
            abstract_text: None,
        })
        .collect()
}

/// Year from dates like "2024 Mar 5", "2023" or "2021/06/01 00:00".
fn leading_year(date: &str) -> Option<i32> {
    let digits: String = date.trim().chars().take(4).collect();
    if digits.len() == 4 && digits.chars().all(|c| c.is_ascii_digit()) {
        digits.parse().ok()
    } else {
        None
    }
}
