//! Menu endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
};
use shared::error::{AppError, ErrorCode};
use shared::models::{Menu, MenuCreate, MenuUpdate};

use crate::db::menus;
use crate::state::AppState;
use crate::util::now_millis;
use crate::validation;

use super::{ApiResult, Json, RestaurantFilter};

fn not_found(id: i64) -> AppError {
    AppError::new(ErrorCode::MenuNotFound).with_detail("menu_id", id)
}

/// GET /menus?restaurant_id=
pub async fn list_menus(
    State(state): State<AppState>,
    Query(filter): Query<RestaurantFilter>,
) -> ApiResult<Vec<Menu>> {
    Ok(Json(menus::list(&state.pool, filter.restaurant_id).await?))
}

/// GET /menus/{id}
pub async fn get_menu(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Menu> {
    let menu = menus::find(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(menu))
}

/// POST /menus
pub async fn create_menu(
    State(state): State<AppState>,
    Json(data): Json<MenuCreate>,
) -> Result<(StatusCode, Json<Menu>), AppError> {
    validation::validate_menu_create(&data)?;
    let menu = menus::create(&state.pool, &data, now_millis()).await?;
    tracing::info!(menu_id = menu.id, restaurant_id = menu.restaurant_id, "Menu created");
    Ok((StatusCode::CREATED, Json(menu)))
}

/// PATCH /menus/{id}
pub async fn update_menu(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(data): Json<MenuUpdate>,
) -> ApiResult<Menu> {
    validation::validate_menu_update(&data)?;
    let menu = menus::update(&state.pool, id, &data, now_millis())
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(menu))
}

/// DELETE /menus/{id}
pub async fn delete_menu(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    if !menus::delete(&state.pool, id).await? {
        return Err(not_found(id));
    }
    Ok(StatusCode::NO_CONTENT)
}
