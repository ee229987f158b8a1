//! # paperwise-db
//!
//! PostgreSQL layer for paperwise.
//!
//! This crate provides:
//! - Connection pool management
//! - The profile signal store (saved items, collections, subject area)
//! - A candidate source over ingested articles
//!
//! ## Example
//!
//! ```rust,ignore
//! use paperwise_db::Database;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::connect("postgres://localhost/paperwise").await?;
//!     let area = db.signals.subject_area(user_id).await?;
//!     println!("Subject area: {:?}", area);
//!     Ok(())
//! }
//! ```
pub mod articles;
pub mod pool;
pub mod signals;

// Re-export core types
pub use paperwise_core::*;

/// Escape LIKE/ILIKE wildcard characters (`%`, `_`, `\`) in user input.
pub fn escape_like(input: &str) -> String {
    input
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

pub use articles::{build_search_query, PgArticleSource};
pub use pool::{create_pool, query_error, PoolConfig};
pub use signals::{PgProfileSignalStore, MAX_SAVED_ITEMS};

/// Combined database context.
#[derive(Clone)]
pub struct Database {
    /// The underlying connection pool.
    pub pool: sqlx::Pool<sqlx::Postgres>,
    /// Saved items, collections and subject areas.
    pub signals: std::sync::Arc<PgProfileSignalStore>,
    /// Ingested articles searchable as recommendation candidates.
    pub articles: std::sync::Arc<PgArticleSource>,
}

impl Database {
    /// Create a new Database instance from a connection pool.
    pub fn new(pool: sqlx::Pool<sqlx::Postgres>) -> Self {
        Self {
            signals: std::sync::Arc::new(PgProfileSignalStore::new(pool.clone())),
            articles: std::sync::Arc::new(PgArticleSource::new(pool.clone())),
            pool,
        }
    }

    /// Create a new Database instance by connecting to the given URL.
    pub async fn connect(url: &str) -> Result<Self> {
        Self::connect_with_config(url, PoolConfig::default()).await
    }

    /// Create with custom pool configuration.
    pub async fn connect_with_config(url: &str, config: PoolConfig) -> Result<Self> {
        let pool = create_pool(url, &config).await?;
        Ok(Self::new(pool))
    }

    /// Run pending migrations.
    #[cfg(feature = "migrations")]
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("../../migrations")
            .run(&self.pool)
            .await
            .map_err(|e| Error::Database(sqlx::Error::Migrate(Box::new(e))))?;
        Ok(())
    }

    /// Get the underlying connection pool.
    pub fn pool(&self) -> &sqlx::Pool<sqlx::Postgres> {
        &self.pool
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("kidney"), "kidney");
        assert_eq!(escape_like("100%"), "100\\%");
        assert_eq!(escape_like("a_b\\c"), "a\\_b\\\\c");
    }
}
