//! Restaurant endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use shared::error::{AppError, ErrorCode};
use shared::models::{Restaurant, RestaurantCreate, RestaurantUpdate};

use crate::db::restaurants;
use crate::state::AppState;
use crate::util::now_millis;
use crate::validation;

use super::{ApiResult, Json};

pub(crate) fn not_found(id: i64) -> AppError {
    AppError::new(ErrorCode::RestaurantNotFound).with_detail("restaurant_id", id)
}

pub(crate) async fn load(state: &AppState, id: i64) -> Result<Restaurant, AppError> {
    restaurants::find(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))
}

#[derive(Debug, Deserialize)]
pub struct RestaurantQuery {
    pub owner_id: Option<i64>,
}

/// GET /restaurants?owner_id=
pub async fn list_restaurants(
    State(state): State<AppState>,
    Query(query): Query<RestaurantQuery>,
) -> ApiResult<Vec<Restaurant>> {
    Ok(Json(restaurants::list(&state.pool, query.owner_id).await?))
}

/// GET /restaurants/{id}
pub async fn get_restaurant(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Restaurant> {
    Ok(Json(load(&state, id).await?))
}

/// POST /restaurants
pub async fn create_restaurant(
    State(state): State<AppState>,
    Json(data): Json<RestaurantCreate>,
) -> Result<(StatusCode, Json<Restaurant>), AppError> {
    validation::validate_restaurant_create(&data)?;
    let restaurant = restaurants::create(&state.pool, &data, now_millis()).await?;
    tracing::info!(restaurant_id = restaurant.id, "Restaurant created");
    Ok((StatusCode::CREATED, Json(restaurant)))
}

/// PATCH /restaurants/{id}
pub async fn update_restaurant(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(data): Json<RestaurantUpdate>,
) -> ApiResult<Restaurant> {
    validation::validate_restaurant_update(&data)?;
    let restaurant = restaurants::update(&state.pool, id, &data, now_millis())
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(restaurant))
}

/// DELETE /restaurants/{id}
pub async fn delete_restaurant(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    if !restaurants::delete(&state.pool, id).await? {
        return Err(not_found(id));
    }
    tracing::info!(restaurant_id = id, "Restaurant deleted");
    Ok(StatusCode::NO_CONTENT)
}
