//! Restaurant database operations

use shared::models::{Restaurant, RestaurantCreate, RestaurantUpdate};
use sqlx::PgPool;

use crate::error::ServiceResult;

pub async fn create(pool: &PgPool, data: &RestaurantCreate, now: i64) -> ServiceResult<Restaurant> {
    let restaurant = sqlx::query_as(
        r#"
        INSERT INTO restaurants (name, owner_id, logo, address, description, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $6)
        RETURNING *
        "#,
    )
    .bind(&data.name)
    .bind(data.owner_id)
    .bind(&data.logo)
    .bind(&data.address)
    .bind(&data.description)
    .bind(now)
    .fetch_one(pool)
    .await?;
    Ok(restaurant)
}

pub async fn find(pool: &PgPool, id: i64) -> ServiceResult<Option<Restaurant>> {
    let restaurant = sqlx::query_as("SELECT * FROM restaurants WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(restaurant)
}

pub async fn list(pool: &PgPool, owner_id: Option<i64>) -> ServiceResult<Vec<Restaurant>> {
    let rows = sqlx::query_as(
        "SELECT * FROM restaurants WHERE ($1::BIGINT IS NULL OR owner_id = $1) ORDER BY id",
    )
    .bind(owner_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn update(
    pool: &PgPool,
    id: i64,
    data: &RestaurantUpdate,
    now: i64,
) -> ServiceResult<Option<Restaurant>> {
    let restaurant = sqlx::query_as(
        r#"
        UPDATE restaurants SET
            name = COALESCE($1, name),
            owner_id = COALESCE($2, owner_id),
            logo = COALESCE($3, logo),
            address = COALESCE($4, address),
            description = COALESCE($5, description),
            updated_at = $6
        WHERE id = $7
        RETURNING *
        "#,
    )
    .bind(&data.name)
    .bind(data.owner_id)
    .bind(&data.logo)
    .bind(&data.address)
    .bind(&data.description)
    .bind(now)
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(restaurant)
}

/// Returns false when no row matched
pub async fn delete(pool: &PgPool, id: i64) -> ServiceResult<bool> {
    let result = sqlx::query("DELETE FROM restaurants WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
