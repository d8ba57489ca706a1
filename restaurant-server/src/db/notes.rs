//! Note database operations

use shared::models::{Note, NoteCreate, NoteUpdate};
use sqlx::PgPool;

use super::constraint_error;
use crate::error::ServiceResult;

pub async fn create(pool: &PgPool, data: &NoteCreate, now: i64) -> ServiceResult<Note> {
    sqlx::query_as(
        r#"
        INSERT INTO notes (restaurant_id, order_id, title, content, priority, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $6)
        RETURNING *
        "#,
    )
    .bind(data.restaurant_id)
    .bind(data.order_id)
    .bind(&data.title)
    .bind(&data.content)
    .bind(data.priority)
    .bind(now)
    .fetch_one(pool)
    .await
    .map_err(|e| constraint_error(e, "Note"))
}

pub async fn find(pool: &PgPool, id: i64) -> ServiceResult<Option<Note>> {
    let note = sqlx::query_as("SELECT * FROM notes WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(note)
}

pub async fn list(pool: &PgPool, restaurant_id: Option<i64>) -> ServiceResult<Vec<Note>> {
    let rows = sqlx::query_as(
        r#"
        SELECT * FROM notes
        WHERE ($1::BIGINT IS NULL OR restaurant_id = $1)
        ORDER BY created_at DESC, id DESC
        "#,
    )
    .bind(restaurant_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn update(
    pool: &PgPool,
    id: i64,
    data: &NoteUpdate,
    now: i64,
) -> ServiceResult<Option<Note>> {
    let note = sqlx::query_as(
        r#"
        UPDATE notes SET
            title = COALESCE($1, title),
            content = COALESCE($2, content),
            priority = COALESCE($3, priority),
            updated_at = $4
        WHERE id = $5
        RETURNING *
        "#,
    )
    .bind(&data.title)
    .bind(&data.content)
    .bind(data.priority)
    .bind(now)
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(note)
}

pub async fn delete(pool: &PgPool, id: i64) -> ServiceResult<bool> {
    let result = sqlx::query("DELETE FROM notes WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
