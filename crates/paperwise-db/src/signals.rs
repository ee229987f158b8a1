//! Profile signal store backed by PostgreSQL.

use async_trait::async_trait;
use sqlx::{Pool, Postgres, Row};
use tracing::{debug, instrument};
use uuid::Uuid;

use paperwise_core::{CollectionSummary, ProfileSignalStore, Result, SavedItem};

use crate::pool::query_error;

/// Upper bound on saved items read per profile build.
pub const MAX_SAVED_ITEMS: i64 = 500;

/// PostgreSQL implementation of ProfileSignalStore.
pub struct PgProfileSignalStore {
    pool: Pool<Postgres>,
}

impl PgProfileSignalStore {
    /// Create a new PgProfileSignalStore with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProfileSignalStore for PgProfileSignalStore {
    #[instrument(skip(self), fields(subsystem = "db", component = "signals", op = "saved_items"))]
    async fn saved_items(&self, user_id: Uuid, project_id: Option<Uuid>) -> Result<Vec<SavedItem>> {
        let rows = sqlx::query(
            r#"
            SELECT id, title, description
            FROM saved_item
            WHERE user_id = $1
              AND ($2::uuid IS NULL OR project_id = $2)
            ORDER BY saved_at_utc DESC
            LIMIT $3
            "#,
        )
        .bind(user_id)
        .bind(project_id)
        .bind(MAX_SAVED_ITEMS)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| query_error(&self.pool, "saved_items", e))?;

        debug!(count = rows.len(), "Loaded saved items");
        Ok(rows
            .into_iter()
            .map(|r| SavedItem {
                id: r.get("id"),
                title: r.get("title"),
                description: r.get("description"),
            })
            .collect())
    }

    #[instrument(skip(self), fields(subsystem = "db", component = "signals", op = "collections"))]
    async fn collections(
        &self,
        user_id: Uuid,
        project_id: Option<Uuid>,
    ) -> Result<Vec<CollectionSummary>> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, description
            FROM collection
            WHERE owner_id = $1
              AND ($2::uuid IS NULL OR project_id = $2)
            ORDER BY created_at_utc
            "#,
        )
        .bind(user_id)
        .bind(project_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| query_error(&self.pool, "collections", e))?;

        debug!(count = rows.len(), "Loaded collections");
        Ok(rows
            .into_iter()
            .map(|r| CollectionSummary {
                id: r.get("id"),
                name: r.get("name"),
                description: r.get("description"),
            })
            .collect())
    }

    #[instrument(skip(self), fields(subsystem = "db", component = "signals", op = "subject_area"))]
    async fn subject_area(&self, user_id: Uuid) -> Result<Option<String>> {
        let row = sqlx::query("SELECT subject_area FROM app_user WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| query_error(&self.pool, "subject_area", e))?;

        Ok(row
            .and_then(|r| r.get::<Option<String>, _>("subject_area"))
            .filter(|s| !s.trim().is_empty()))
    }
}
