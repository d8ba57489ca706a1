//! Dining table database operations

use shared::models::{DiningTable, DiningTableCreate, DiningTableUpdate};
use sqlx::PgPool;

use super::constraint_error;
use crate::error::ServiceResult;

pub async fn create(pool: &PgPool, data: &DiningTableCreate, now: i64) -> ServiceResult<DiningTable> {
    sqlx::query_as(
        r#"
        INSERT INTO tables (
            restaurant_id, name, table_number, capacity, location, status, created_at, updated_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $7)
        RETURNING *
        "#,
    )
    .bind(data.restaurant_id)
    .bind(&data.name)
    .bind(data.table_number)
    .bind(data.capacity)
    .bind(&data.location)
    .bind(data.status.unwrap_or_default())
    .bind(now)
    .fetch_one(pool)
    .await
    .map_err(|e| constraint_error(e, "Table"))
}

pub async fn find(pool: &PgPool, id: i64) -> ServiceResult<Option<DiningTable>> {
    let table = sqlx::query_as("SELECT * FROM tables WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(table)
}

pub async fn list(pool: &PgPool, restaurant_id: Option<i64>) -> ServiceResult<Vec<DiningTable>> {
    let rows = sqlx::query_as(
        r#"
        SELECT * FROM tables
        WHERE ($1::BIGINT IS NULL OR restaurant_id = $1)
        ORDER BY restaurant_id, table_number
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
    data: &DiningTableUpdate,
    now: i64,
) -> ServiceResult<Option<DiningTable>> {
    sqlx::query_as(
        r#"
        UPDATE tables SET
            name = COALESCE($1, name),
            table_number = COALESCE($2, table_number),
            capacity = COALESCE($3, capacity),
            location = COALESCE($4, location),
            status = COALESCE($5, status),
            updated_at = $6
        WHERE id = $7
        RETURNING *
        "#,
    )
    .bind(&data.name)
    .bind(data.table_number)
    .bind(data.capacity)
    .bind(&data.location)
    .bind(data.status)
    .bind(now)
    .bind(id)
    .fetch_optional(pool)
    .await
    .map_err(|e| constraint_error(e, "Table"))
}

pub async fn delete(pool: &PgPool, id: i64) -> ServiceResult<bool> {
    let result = sqlx::query("DELETE FROM tables WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
