//! Food endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
};
use shared::error::{AppError, ErrorCode};
use shared::models::{Food, FoodCreate, FoodUpdate};

use crate::db::foods;
use crate::state::AppState;
use crate::util::now_millis;
use crate::validation;

use super::{ApiResult, Json, RestaurantFilter};

fn not_found(id: i64) -> AppError {
    AppError::new(ErrorCode::FoodNotFound).with_detail("food_id", id)
}

/// GET /foods?restaurant_id=
pub async fn list_foods(
    State(state): State<AppState>,
    Query(filter): Query<RestaurantFilter>,
) -> ApiResult<Vec<Food>> {
    Ok(Json(foods::list(&state.pool, filter.restaurant_id).await?))
}

/// GET /foods/{id}
pub async fn get_food(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Food> {
    let food = foods::find(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(food))
}

/// POST /foods
pub async fn create_food(
    State(state): State<AppState>,
    Json(data): Json<FoodCreate>,
) -> Result<(StatusCode, Json<Food>), AppError> {
    validation::validate_food_create(&data)?;
    let food = foods::create(&state.pool, &data, now_millis()).await?;
    tracing::info!(food_id = food.id, price = %food.price, "Food created");
    Ok((StatusCode::CREATED, Json(food)))
}

/// PATCH /foods/{id}
pub async fn update_food(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(data): Json<FoodUpdate>,
) -> ApiResult<Food> {
    validation::validate_food_update(&data)?;
    let food = foods::update(&state.pool, id, &data, now_millis())
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(food))
}

/// DELETE /foods/{id}
pub async fn delete_food(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    if !foods::delete(&state.pool, id).await? {
        return Err(not_found(id));
    }
    Ok(StatusCode::NO_CONTENT)
}
