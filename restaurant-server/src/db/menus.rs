//! Menu database operations

use shared::models::{Menu, MenuCreate, MenuUpdate};
use sqlx::PgPool;

use super::constraint_error;
use crate::error::ServiceResult;

pub async fn create(pool: &PgPool, data: &MenuCreate, now: i64) -> ServiceResult<Menu> {
    sqlx::query_as(
        r#"
        INSERT INTO menus (restaurant_id, name, description, active, created_at, updated_at)
        VALUES ($1, $2, $3, TRUE, $4, $4)
        RETURNING *
        "#,
    )
    .bind(data.restaurant_id)
    .bind(data.name)
    .bind(&data.description)
    .bind(now)
    .fetch_one(pool)
    .await
    .map_err(|e| constraint_error(e, "Menu"))
}

pub async fn find(pool: &PgPool, id: i64) -> ServiceResult<Option<Menu>> {
    let menu = sqlx::query_as("SELECT * FROM menus WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(menu)
}

pub async fn list(pool: &PgPool, restaurant_id: Option<i64>) -> ServiceResult<Vec<Menu>> {
    let rows = sqlx::query_as(
        r#"
        SELECT * FROM menus
        WHERE ($1::BIGINT IS NULL OR restaurant_id = $1)
        ORDER BY restaurant_id, id
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
    data: &MenuUpdate,
    now: i64,
) -> ServiceResult<Option<Menu>> {
    let menu = sqlx::query_as(
        r#"
        UPDATE menus SET
            name = COALESCE($1, name),
            description = COALESCE($2, description),
            active = COALESCE($3, active),
            updated_at = $4
        WHERE id = $5
        RETURNING *
        "#,
    )
    .bind(data.name)
    .bind(&data.description)
    .bind(data.active)
    .bind(now)
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(menu)
}

pub async fn delete(pool: &PgPool, id: i64) -> ServiceResult<bool> {
    let result = sqlx::query("DELETE FROM menus WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
