//! Dining table endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
};
use shared::error::{AppError, ErrorCode};
use shared::models::{DiningTable, DiningTableCreate, DiningTableUpdate};

use crate::db::tables;
use crate::state::AppState;
use crate::util::now_millis;
use crate::validation;

use super::{ApiResult, Json, RestaurantFilter};

pub(crate) fn not_found(id: i64) -> AppError {
    AppError::new(ErrorCode::TableNotFound).with_detail("table_id", id)
}

pub(crate) async fn load(state: &AppState, id: i64) -> Result<DiningTable, AppError> {
    tables::find(&state.pool, id).await?.ok_or_else(|| not_found(id))
}

/// GET /tables?restaurant_id=
pub async fn list_tables(
    State(state): State<AppState>,
    Query(filter): Query<RestaurantFilter>,
) -> ApiResult<Vec<DiningTable>> {
    Ok(Json(tables::list(&state.pool, filter.restaurant_id).await?))
}

/// GET /tables/{id}
pub async fn get_table(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<DiningTable> {
    Ok(Json(load(&state, id).await?))
}

/// POST /tables
pub async fn create_table(
    State(state): State<AppState>,
    Json(data): Json<DiningTableCreate>,
) -> Result<(StatusCode, Json<DiningTable>), AppError> {
    validation::validate_table_create(&data)?;
    let table = tables::create(&state.pool, &data, now_millis()).await?;
    tracing::info!(table_id = table.id, restaurant_id = table.restaurant_id, "Table created");
    Ok((StatusCode::CREATED, Json(table)))
}

/// PATCH /tables/{id}
pub async fn update_table(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(data): Json<DiningTableUpdate>,
) -> ApiResult<DiningTable> {
    validation::validate_table_update(&data)?;
    let table = tables::update(&state.pool, id, &data, now_millis())
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(table))
}

/// DELETE /tables/{id}
pub async fn delete_table(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    if !tables::delete(&state.pool, id).await? {
        return Err(not_found(id));
    }
    Ok(StatusCode::NO_CONTENT)
}
