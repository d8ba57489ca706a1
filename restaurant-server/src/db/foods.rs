//! Food database operations

use rust_decimal::Decimal;
use shared::models::{Food, FoodCreate, FoodUpdate};
use sqlx::PgPool;

use super::constraint_error;
use crate::error::ServiceResult;

/// Prices are stored with two decimals
fn money(price: Decimal) -> Decimal {
    crate::orders::pricing::to_money(price)
}

pub async fn create(pool: &PgPool, data: &FoodCreate, now: i64) -> ServiceResult<Food> {
    sqlx::query_as(
        r#"
        INSERT INTO foods (
            name, description, price, image_url, menu_id, restaurant_id, ingredients,
            prep_time, calories, spicy_level, vegetarian, available, created_at, updated_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $13)
        RETURNING *
        "#,
    )
    .bind(&data.name)
    .bind(&data.description)
    .bind(money(data.price))
    .bind(&data.image_url)
    .bind(data.menu_id)
    .bind(data.restaurant_id)
    .bind(&data.ingredients)
    .bind(data.prep_time)
    .bind(data.calories)
    .bind(data.spicy_level)
    .bind(data.vegetarian.unwrap_or(true))
    .bind(data.available.unwrap_or(true))
    .bind(now)
    .fetch_one(pool)
    .await
    .map_err(|e| constraint_error(e, "Food"))
}

pub async fn find(pool: &PgPool, id: i64) -> ServiceResult<Option<Food>> {
    let food = sqlx::query_as("SELECT * FROM foods WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(food)
}

pub async fn list(pool: &PgPool, restaurant_id: Option<i64>) -> ServiceResult<Vec<Food>> {
    let rows = sqlx::query_as(
        r#"
        SELECT * FROM foods
        WHERE ($1::BIGINT IS NULL OR restaurant_id = $1)
        ORDER BY menu_id, name
        "#,
    )
    .bind(restaurant_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Changing the price does not touch existing order items (they keep their
/// snapshot).
pub async fn update(
    pool: &PgPool,
    id: i64,
    data: &FoodUpdate,
    now: i64,
) -> ServiceResult<Option<Food>> {
    sqlx::query_as(
        r#"
        UPDATE foods SET
            name = COALESCE($1, name),
            description = COALESCE($2, description),
            price = COALESCE($3, price),
            image_url = COALESCE($4, image_url),
            menu_id = COALESCE($5, menu_id),
            ingredients = COALESCE($6, ingredients),
            prep_time = COALESCE($7, prep_time),
            calories = COALESCE($8, calories),
            spicy_level = COALESCE($9, spicy_level),
            vegetarian = COALESCE($10, vegetarian),
            available = COALESCE($11, available),
            updated_at = $12
        WHERE id = $13
        RETURNING *
        "#,
    )
    .bind(&data.name)
    .bind(&data.description)
    .bind(data.price.map(money))
    .bind(&data.image_url)
    .bind(data.menu_id)
    .bind(&data.ingredients)
    .bind(data.prep_time)
    .bind(data.calories)
    .bind(data.spicy_level)
    .bind(data.vegetarian)
    .bind(data.available)
    .bind(now)
    .bind(id)
    .fetch_optional(pool)
    .await
    .map_err(|e| constraint_error(e, "Food"))
}

pub async fn delete(pool: &PgPool, id: i64) -> ServiceResult<bool> {
    let result = sqlx::query("DELETE FROM foods WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
