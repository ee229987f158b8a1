//! Fan a query out over several sources in order.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use paperwise_core::{logging, CandidateQuery, CandidateSource, Error, Result, SourcePaper};
use tracing::{debug, warn};

/// Queries each source in turn and merges unique papers.
///
/// Stops once `max_results` papers are collected. A failing source is
/// skipped; the chain only fails when every source failed.
pub struct ChainedSource {
    sources: Vec<Arc<dyn CandidateSource>>,
}

impl ChainedSource {
    pub fn new(sources: Vec<Arc<dyn CandidateSource>>) -> Self {
        Self { sources }
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

#[async_trait]
impl CandidateSource for ChainedSource {
    fn name(&self) -> &str {
        "chained"
    }

    async fn search(&self, query: &CandidateQuery) -> Result<Vec<SourcePaper>> {
        let mut merged: Vec<SourcePaper> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();
        let mut failures: Vec<String> = Vec::new();

        for source in &self.sources {
            if merged.len() >= query.max_results {
                break;
            }
            match source.search(query).await {
                Ok(papers) => {
                    let before = merged.len();
                    for paper in papers {
                        if merged.len() >= query.max_results {
                            break;
                        }
                        if seen.insert(paper.id.clone()) {
                            merged.push(paper);
                        }
                    }
                    debug!(
                        source = source.name(),
                        { logging::RESULT_COUNT } = merged.len() - before,
                        "Merged source results"
                    );
                }
                Err(e) => {
                    warn!(
                        source = source.name(),
                        { logging::ERROR_MSG } = %e,
                        "Candidate source failed, trying next"
                    );
                    failures.push(format!("{}: {}", source.name(), e));
                }
            }
        }

        if !self.sources.is_empty() && failures.len() == self.sources.len() {
            return Err(Error::Source(format!(
                "all sources failed ({})",
                failures.join("; ")
            )));
        }
        Ok(merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed {
        name: &'static str,
        ids: Vec<&'static str>,
        fail: bool,
    }

    #[async_trait]
    impl CandidateSource for Fixed {
        fn name(&self) -> &str {
            self.name
        }

        async fn search(&self, _query: &CandidateQuery) -> Result<Vec<SourcePaper>> {
            if self.fail {
                return Err(Error::Source(format!("{} offline", self.name)));
            }
            Ok(self
                .ids
                .iter()
                .map(|id| SourcePaper {
                    id: id.to_string(),
                    title: format!("Paper {}", id),
                    authors: vec![],
                    year: 2024,
                    citation_count: 0,
                    journal: None,
                    abstract_text: None,
                })
                .collect())
        }
    }

    fn fixed(name: &'static str, ids: &[&'static str]) -> Arc<dyn CandidateSource> {
        Arc::new(Fixed {
            name,
            ids: ids.to_vec(),
            fail: false,
        })
    }

    fn failing(name: &'static str) -> Arc<dyn CandidateSource> {
        Arc::new(Fixed {
            name,
            ids: vec![],
            fail: true,
        })
    }

    fn ids(papers: &[SourcePaper]) -> Vec<&str> {
        papers.iter().map(|p| p.id.as_str()).collect()
    }

    #[tokio::test]
    async fn test_merges_unique_in_order() {
        let chain = ChainedSource::new(vec![fixed("a", &["1", "2"]), fixed("b", &["2", "3"])]);
        let papers = chain.search(&CandidateQuery::any_of(["kidney"])).await.unwrap();
        assert_eq!(ids(&papers), vec!["1", "2", "3"]);
    }

    #[tokio::test]
    async fn test_stops_at_max_results() {
        let chain = ChainedSource::new(vec![fixed("a", &["1", "2", "3"]), failing("b")]);
        let papers = chain
            .search(&CandidateQuery::any_of(["kidney"]).limit(2))
            .await
            .unwrap();
        assert_eq!(ids(&papers), vec!["1", "2"]);
    }

    #[tokio::test]
    async fn test_skips_failing_source() {
        let chain = ChainedSource::new(vec![failing("a"), fixed("b", &["9"])]);
        let papers = chain.search(&CandidateQuery::any_of(["kidney"])).await.unwrap();
        assert_eq!(ids(&papers), vec!["9"]);
    }

    #[tokio::test]
    async fn test_all_failing_is_error() {
        let chain = ChainedSource::new(vec![failing("a"), failing("b")]);
        let err = chain
            .search(&CandidateQuery::any_of(["kidney"]))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Source(_)));
    }

    #[tokio::test]
    async fn test_empty_chain_returns_nothing() {
        let chain = ChainedSource::new(vec![]);
        assert!(chain.is_empty());
        let papers = chain.search(&CandidateQuery::any_of(["kidney"])).await.unwrap();
        assert!(papers.is_empty());
    }
}
