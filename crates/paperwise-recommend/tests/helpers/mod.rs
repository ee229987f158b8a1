//! Test helpers for recommendation engine integration tests.
//!
//! Provides an in-memory catalogue source, an in-memory signal store and
//! paper builders.

#![allow(dead_code)]

use std::sync::Mutex;

use async_trait::async_trait;
use paperwise_recommend::domains::count_keyword_hits;
use paperwise_recommend::{
    CandidateQuery, CandidateSource, CollectionSummary, Error, ProfileSignalStore, Result,
    SavedItem, SortBy, SourcePaper,
};
use uuid::Uuid;

pub fn paper(id: &str, title: &str, year: i32, citations: u32) -> SourcePaper {
    SourcePaper {
        id: id.to_string(),
        title: title.to_string(),
        authors: vec!["Rivera A".to_string(), "Okafor B".to_string()],
        year,
        citation_count: citations,
        journal: Some("Journal of Test Medicine".to_string()),
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

/// A catalogue searched like a bibliographic index: every non-empty query
/// group must match the title, and the year filter is honoured.
#[derive(Default)]
pub struct Catalog {
    papers: Vec<SourcePaper>,
    queries: Mutex<Vec<CandidateQuery>>,
}

impl Catalog {
    pub fn new(papers: Vec<SourcePaper>) -> Self {
        Self {
            papers,
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn query_count(&self) -> usize {
        self.queries.lock().unwrap().len()
    }
}

#[async_trait]
impl CandidateSource for Catalog {
    fn name(&self) -> &str {
        "catalog"
    }

    async fn search(&self, query: &CandidateQuery) -> Result<Vec<SourcePaper>> {
        self.queries.lock().unwrap().push(query.clone());
        let mut hits: Vec<SourcePaper> = self
            .papers
            .iter()
            .filter(|p| query.published_after.map_or(true, |y| p.year >= y))
            .filter(|p| {
                query
                    .groups
                    .iter()
                    .filter(|g| !g.is_empty())
                    .all(|g| g.iter().any(|t| count_keyword_hits(t, &p.title) > 0))
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
pub struct Signals {
    pub saved: Vec<SavedItem>,
    pub collections: Vec<CollectionSummary>,
    pub subject_area: Option<String>,
    pub unreachable: bool,
}

#[async_trait]
impl ProfileSignalStore for Signals {
    async fn saved_items(&self, _user: Uuid, _project: Option<Uuid>) -> Result<Vec<SavedItem>> {
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
        Ok(self.collections.clone())
    }

    async fn subject_area(&self, _user: Uuid) -> Result<Option<String>> {
        Ok(self.subject_area.clone())
    }
}

/// A nephrology-heavy catalogue with pharmacology overlap.
pub fn nephrology_catalog(current_year: i32) -> Vec<SourcePaper> {
    let mut papers = Vec::new();
    for i in 0..40 {
        let year = current_year - (i % 6);
        let title = match i % 4 {
            0 => format!("Kidney function decline cohort {}", i),
            1 => format!("Renal drug dosing in dialysis {}", i),
            2 => format!("Nephrology practice patterns {}", i),
            _ => format!("Kidney transplant pharmacokinetic study {}", i),
        };
        papers.push(paper(&format!("PMID{}", 1000 + i), &title, year, (i * 7 % 60) as u32));
    }
    papers
}
