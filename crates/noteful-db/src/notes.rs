//! Note repository implementation.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{postgres::PgRow, Pool, Postgres, QueryBuilder, Row};
use tracing::{debug, info};
use uuid::Uuid;

use noteful_core::{new_v7, Error, Note, NoteDraft, NoteFilter, NoteRepository, Result};

use crate::{escape_like, map_write_error};

const NOTE_COLUMNS: &str = "id, title, content, folder_id, tag_ids, created_at, updated_at";

/// PostgreSQL implementation of NoteRepository.
#[derive(Clone)]
pub struct PgNoteRepository {
    pool: Pool<Postgres>,
}

impl PgNoteRepository {
    /// Create a new PgNoteRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

fn note_from_row(r: PgRow) -> Note {
    Note {
        id: r.get("id"),
        title: r.get("title"),
        content: r.get("content"),
        folder_id: r.get("folder_id"),
        tags: r.get("tag_ids"),
        created_at: r.get("created_at"),
        updated_at: r.get("updated_at"),
    }
}

/// Build the list query for `filter`. Every filter value is bound, never
/// interpolated.
fn build_list_query(filter: &NoteFilter) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new(format!("SELECT {} FROM note WHERE TRUE", NOTE_COLUMNS));

    if let Some(term) = &filter.search_term {
        qb.push(" AND title ILIKE ")
            .push_bind(format!("%{}%", escape_like(term)));
    }
    if let Some(folder_id) = filter.folder_id {
        qb.push(" AND folder_id = ").push_bind(folder_id);
    }
    if let Some(tag_id) = filter.tag_id {
        qb.push(" AND ").push_bind(tag_id).push(" = ANY(tag_ids)");
    }

    qb.push(" ORDER BY id");
    qb
}

#[async_trait]
impl NoteRepository for PgNoteRepository {
    async fn list(&self, filter: &NoteFilter) -> Result<Vec<Note>> {
        let mut qb = build_list_query(filter);
        let rows = qb
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)?;

        debug!(
            subsystem = "db",
            component = "notes",
            op = "list",
            result_count = rows.len(),
            filtered = !filter.is_empty(),
            "Listed notes"
        );
        Ok(rows.into_iter().map(note_from_row).collect())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Note>> {
        let row = sqlx::query(&format!("SELECT {} FROM note WHERE id = $1", NOTE_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(row.map(note_from_row))
    }

    async fn create(&self, draft: &NoteDraft) -> Result<Note> {
        let id = new_v7();
        let now = Utc::now();
        let tags = draft.tags.clone().unwrap_or_default();

        let row = sqlx::query(&format!(
            "INSERT INTO note (id, title, content, folder_id, tag_ids, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $6)
             RETURNING {}",
            NOTE_COLUMNS
        ))
        .bind(id)
        .bind(&draft.title)
        .bind(&draft.content)
        .bind(draft.folder_id)
        .bind(&tags)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(map_write_error)?;

        info!(
            subsystem = "db",
            component = "notes",
            op = "create",
            note_id = %id,
            "Note created"
        );
        Ok(note_from_row(row))
    }

    async fn update(&self, id: Uuid, draft: &NoteDraft) -> Result<Option<Note>> {
        // A NULL tag array keeps the stored tags.
        let row = sqlx::query(&format!(
            "UPDATE note
             SET title = $1, content = $2, folder_id = $3,
                 tag_ids = COALESCE($4, tag_ids), updated_at = $5
             WHERE id = $6
             RETURNING {}",
            NOTE_COLUMNS
        ))
        .bind(&draft.title)
        .bind(&draft.content)
        .bind(draft.folder_id)
        .bind(&draft.tags)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_write_error)?;

        Ok(row.map(note_from_row))
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM note WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(result.rows_affected() > 0)
    }

    async fn remove_tag(&self, tag_id: Uuid) -> Result<u64> {
        let result = sqlx::query(
            "UPDATE note SET tag_ids = array_remove(tag_ids, $1), updated_at = $2
             WHERE $1 = ANY(tag_ids)",
        )
        .bind(tag_id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        let changed = result.rows_affected();
        info!(
            subsystem = "db",
            component = "notes",
            op = "remove_tag",
            tag_id = %tag_id,
            rows_affected = changed,
            "Removed tag from notes"
        );
        Ok(changed)
    }

    async fn clear_folder(&self, folder_id: Uuid) -> Result<u64> {
        let result = sqlx::query(
            "UPDATE note SET folder_id = NULL, updated_at = $2 WHERE folder_id = $1",
        )
        .bind(folder_id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        let changed = result.rows_affected();
        info!(
            subsystem = "db",
            component = "notes",
            op = "clear_folder",
            folder_id = %folder_id,
            rows_affected = changed,
            "Cleared folder from notes"
        );
        Ok(changed)
    }
}
