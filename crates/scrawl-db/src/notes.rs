//! PostgreSQL note store implementation.

use async_trait::async_trait;
use sqlx::{postgres::PgRow, Pool, Postgres, Row};
use uuid::Uuid;

use scrawl_core::{Error, Note, NoteFieldUpdate, NoteStore, Result};

/// PostgreSQL implementation of [`NoteStore`].
///
/// One row per note; the row's primary key equals the note id. Listing
/// pushes the newest-first ordering into the query.
pub struct PgNoteStore {
    pool: Pool<Postgres>,
}

impl PgNoteStore {
    /// Create a new PgNoteStore with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

fn map_row(row: PgRow) -> Note {
    Note {
        id: row.get("id"),
        user_id: row.get("user_id"),
        title: row.get("title"),
        content: row.get("content"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

#[async_trait]
impl NoteStore for PgNoteStore {
    async fn insert(&self, note: &Note) -> Result<()> {
        sqlx::query(
            "INSERT INTO note (id, user_id, title, content, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(note.id)
        .bind(&note.user_id)
        .bind(&note.title)
        .bind(&note.content)
        .bind(note.created_at)
        .bind(note.updated_at)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;
        Ok(())
    }

    async fn fetch(&self, id: Uuid) -> Result<Option<Note>> {
        let row = sqlx::query(
            "SELECT id, user_id, title, content, created_at, updated_at
             FROM note WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(row.map(map_row))
    }

    async fn list_for_user(&self, user_id: &str) -> Result<Vec<Note>> {
        let rows = sqlx::query(
            "SELECT id, user_id, title, content, created_at, updated_at
             FROM note WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows.into_iter().map(map_row).collect())
    }

    async fn update_fields(&self, id: Uuid, update: NoteFieldUpdate) -> Result<bool> {
        // $1 = updated_at, $2 = id, dynamic params start at $3
        let mut updates: Vec<String> = vec!["updated_at = $1".to_string()];
        let mut param_idx = 3;

        if update.title.is_some() {
            updates.push(format!("title = ${}", param_idx));
            param_idx += 1;
        }
        if update.content.is_some() {
            updates.push(format!("content = ${}", param_idx));
        }

        let query = format!("UPDATE note SET {} WHERE id = $2", updates.join(", "));

        let mut q = sqlx::query(&query).bind(update.updated_at).bind(id);
        if let Some(title) = update.title {
            q = q.bind(title);
        }
        if let Some(content) = update.content {
            q = q.bind(content);
        }

        let result = q.execute(&self.pool).await.map_err(Error::Database)?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM note WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(result.rows_affected() > 0)
    }
}
