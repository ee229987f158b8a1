//! In-memory collaborators for unit tests.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use paperwise_core::domains::count_keyword_hits;
use paperwise_core::{
    CandidateQuery, CandidateSource, CollectionSummary, Error, ProfileSignalStore, Result,
    SavedItem, SortBy, SourcePaper,
};
use uuid::Uuid;

pub fn paper(id: &str, title: &str, year: i32, citations: u32) -> SourcePaper {
    SourcePaper {
        id: id.to_string(),
        title: title.to_string(),
        authors: vec!["Doe J".to_string()],
        year,
        citation_count: citations,
        journal: None,
        abstract_text: None,
    }
}

pub fn saved(title: &str) -> SavedItem {
    SavedItem {
        id: Uuid::new_v4(),
        title: title.to_string(),
        description: None,
    }
}

pub fn collection(name: &str) -> CollectionSummary {
    CollectionSummary {
        id: Uuid::new_v4(),
        name: name.to_string(),
        description: None,
    }
}

/// Fixed catalogue searched the way a bibliographic index would.
///
/// A paper matches when every query group has a term occurring at a word
/// start in its title, and it is not older than `published_after`.
#[derive(Default)]
pub struct CatalogSource {
    papers: Vec<SourcePaper>,
    pub queries: Mutex<Vec<CandidateQuery>>,
    delay: Option<Duration>,
    failing: bool,
}

impl CatalogSource {
    pub fn new(papers: Vec<SourcePaper>) -> Self {
        Self {
            papers,
            ..Default::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Default::default()
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn query_count(&self) -> usize {
        self.queries.lock().unwrap().len()
    }
}

fn term_matches(term: &str, text: &str) -> bool {
    count_keyword_hits(term, text) > 0
}

#[async_trait]
impl CandidateSource for CatalogSource {
    fn name(&self) -> &str {
        "catalog"
    }

    async fn search(&self, query: &CandidateQuery) -> Result<Vec<SourcePaper>> {
        self.queries.lock().unwrap().push(query.clone());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing {
            return Err(Error::Source("catalog offline".to_string()));
        }

        let mut hits: Vec<SourcePaper> = self
            .papers
            .iter()
            .filter(|p| query.published_after.map_or(true, |y| p.year >= y))
            .filter(|p| {
                query
                    .groups
                    .iter()
                    .filter(|g| !g.is_empty())
                    .all(|g| g.iter().any(|t| term_matches(t, &p.title)))
            })
            .cloned()
            .collect();
        if query.sort_by == SortBy::Date {
            hits.sort_by(|a, b| b.year.cmp(&a.year));
        }
        hits.truncate(query.max_results);
        Ok(hits)
    }
}

#[derive(Default)]
pub struct MemorySignals {
    pub saved: Vec<SavedItem>,
    pub collections: Vec<CollectionSummary>,
    pub subject_area: Option<String>,
    pub unreachable: bool,
    pub calls: Mutex<Vec<&'static str>>,
}

#[async_trait]
impl ProfileSignalStore for MemorySignals {
    async fn saved_items(&self, _user: Uuid, _project: Option<Uuid>) -> Result<Vec<SavedItem>> {
        self.calls.lock().unwrap().push("saved_items");
        if self.unreachable {
            return Err(Error::SignalStore("connection refused".to_string()));
        }
        Ok(self.saved.clone())
    }

    async fn collections(
        &self,
        _user: Uuid,
        _project: Option<Uuid>,
    ) -> Result<Vec<CollectionSummary>> {
        self.calls.lock().unwrap().push("collections");
        Ok(self.collections.clone())
    }

    async fn subject_area(&self, _user: Uuid) -> Result<Option<String>> {
        self.calls.lock().unwrap().push("subject_area");
        Ok(self.subject_area.clone())
    }
}
