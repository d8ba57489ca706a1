//! Order item endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
};
use shared::error::AppError;
use shared::models::{OrderItem, OrderItemCreate, OrderItemUpdate};

use crate::state::AppState;

use super::{ApiResult, Json};

/// GET /order-items
pub async fn list_items(State(state): State<AppState>) -> ApiResult<Vec<OrderItem>> {
    Ok(Json(state.orders.list_all_items().await?))
}

/// GET /order-items/{id}
pub async fn get_item(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<OrderItem> {
    Ok(Json(state.orders.get_item(id).await?))
}

/// POST /order-items
pub async fn create_item(
    State(state): State<AppState>,
    Json(req): Json<OrderItemCreate>,
) -> Result<(StatusCode, Json<OrderItem>), AppError> {
    let item = state
        .orders
        .attach_item(req.order_id, req.food_id, req.quantity)
        .await?;
    Ok((StatusCode::CREATED, Json(item)))
}

/// PATCH /order-items/{id}
pub async fn update_item(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<OrderItemUpdate>,
) -> ApiResult<OrderItem> {
    Ok(Json(state.orders.update_item_quantity(id, req.quantity).await?))
}

/// DELETE /order-items/{id}
pub async fn delete_item(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    state.orders.delete_item(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
