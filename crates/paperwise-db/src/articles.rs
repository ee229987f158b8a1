//! Candidate source over previously ingested articles.
//!
//! Terms match title or abstract case-insensitively. Query groups are ANDed,
//! terms inside a group ORed, mirroring the bibliographic query syntax.

use async_trait::async_trait;
use chrono::{Datelike, Utc};
use sqlx::{Pool, Postgres, QueryBuilder, Row};
use tracing::{debug, instrument, warn};

use crate::escape_like;
use paperwise_core::{
    logging, CandidateQuery, CandidateSource, Error, RawPaperRecord, Result, SortBy, SourcePaper,
};

/// Build the article search statement for a query.
pub fn build_search_query(query: &CandidateQuery) -> QueryBuilder<'static, Postgres> {
    let mut builder: QueryBuilder<'static, Postgres> = QueryBuilder::new(
        "SELECT id, title, abstract_text, authors, year, journal, citation_count FROM article WHERE TRUE",
    );

    for group in query.groups.iter().filter(|g| !g.is_empty()) {
        builder.push(" AND (");
        for (i, term) in group.iter().enumerate() {
            if i > 0 {
                builder.push(" OR ");
            }
            let pattern = format!("%{}%", escape_like(term));
            builder.push("title ILIKE ");
            builder.push_bind(pattern.clone());
            builder.push(" OR abstract_text ILIKE ");
            builder.push_bind(pattern);
        }
        builder.push(")");
    }

    if let Some(year) = query.published_after {
        builder.push(" AND year >= ");
        builder.push_bind(year);
    }

    builder.push(match query.sort_by {
        SortBy::Relevance => " ORDER BY citation_count DESC NULLS LAST, year DESC NULLS LAST",
        SortBy::Date => " ORDER BY year DESC NULLS LAST, citation_count DESC NULLS LAST",
    });
    builder.push(" LIMIT ");
    builder.push_bind(query.max_results as i64);
    builder
}

/// PostgreSQL implementation of CandidateSource.
pub struct PgArticleSource {
    pool: Pool<Postgres>,
}

impl PgArticleSource {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CandidateSource for PgArticleSource {
    fn name(&self) -> &str {
        "articles"
    }

    #[instrument(
        skip(self, query),
        fields(subsystem = "db", component = "articles", op = "search")
    )]
    async fn search(&self, query: &CandidateQuery) -> Result<Vec<SourcePaper>> {
        if query.is_empty() || query.max_results == 0 {
            return Ok(Vec::new());
        }

        let mut builder = build_search_query(query);
        let rows = builder
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| Error::Source(format!("article query failed: {}", e)))?;

        let current_year = Utc::now().year();
        let mut papers = Vec::with_capacity(rows.len());
        for r in rows {
            let record = RawPaperRecord {
                id: r.get("id"),
                title: r.get("title"),
                authors: r.get("authors"),
                year: r.get("year"),
                citation_count: r.get("citation_count"),
                journal: r.get("journal"),
                abstract_text: r.get("abstract_text"),
            };
            match record.validate(current_year) {
                Ok(paper) => papers.push(paper),
                Err(e) => warn!({ logging::ERROR_MSG } = %e, "Skipping malformed article"),
            }
        }

        debug!({ logging::RESULT_COUNT } = papers.len(), "Article search complete");
        Ok(papers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_search_query_groups_and_filters() {
        let query = CandidateQuery::any_of(["kidney", "renal"])
            .and_any_of(["drug"])
            .published_since(2023)
            .sorted_by(SortBy::Date)
            .limit(10);
        let builder = build_search_query(&query);
        let sql = builder.sql();

        assert!(sql.contains(
            "AND (title ILIKE $1 OR abstract_text ILIKE $2 OR title ILIKE $3 OR abstract_text ILIKE $4)"
        ));
        assert!(sql.contains("AND (title ILIKE $5 OR abstract_text ILIKE $6)"));
        assert!(sql.contains("AND year >= $7"));
        assert!(sql.contains("ORDER BY year DESC"));
        assert!(sql.ends_with("LIMIT $8"));
    }

    #[test]
    fn test_build_search_query_relevance_without_year() {
        let builder = build_search_query(&CandidateQuery::any_of(["cancer"]));
        let sql = builder.sql();
        assert!(!sql.contains("year >="));
        assert!(sql.contains("ORDER BY citation_count DESC"));
    }
}
