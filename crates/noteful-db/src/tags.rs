//! Tag repository implementation.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{postgres::PgRow, Pool, Postgres, Row};
use tracing::info;
use uuid::Uuid;

use noteful_core::{new_v7, Error, Result, Tag, TagDraft, TagRepository};

use crate::map_write_error;

/// PostgreSQL implementation of TagRepository.
#[derive(Clone)]
pub struct PgTagRepository {
    pool: Pool<Postgres>,
}

impl PgTagRepository {
    /// Create a new PgTagRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

fn tag_from_row(r: PgRow) -> Tag {
    Tag {
        id: r.get("id"),
        name: r.get("name"),
        created_at: r.get("created_at"),
        updated_at: r.get("updated_at"),
    }
}

#[async_trait]
impl TagRepository for PgTagRepository {
    async fn list(&self) -> Result<Vec<Tag>> {
        let rows = sqlx::query(
            r#"SELECT id, name, created_at, updated_at FROM tag ORDER BY name COLLATE "C", id"#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows.into_iter().map(tag_from_row).collect())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Tag>> {
        let row = sqlx::query("SELECT id, name, created_at, updated_at FROM tag WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(row.map(tag_from_row))
    }

    async fn create(&self, draft: &TagDraft) -> Result<Tag> {
        let id = new_v7();
        let now = Utc::now();

        let row = sqlx::query(
            "INSERT INTO tag (id, name, created_at, updated_at)
             VALUES ($1, $2, $3, $3)
             RETURNING id, name, created_at, updated_at",
        )
        .bind(id)
        .bind(&draft.name)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(map_write_error)?;

        info!(
            subsystem = "db",
            component = "tags",
            op = "create",
            tag_id = %id,
            "Tag created"
        );
        Ok(tag_from_row(row))
    }

    async fn update(&self, id: Uuid, draft: &TagDraft) -> Result<Option<Tag>> {
        let row = sqlx::query(
            "UPDATE tag SET name = $1, updated_at = $2 WHERE id = $3
             RETURNING id, name, created_at, updated_at",
        )
        .bind(&draft.name)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_write_error)?;

        Ok(row.map(tag_from_row))
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM tag WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(result.rows_affected() > 0)
    }
}
