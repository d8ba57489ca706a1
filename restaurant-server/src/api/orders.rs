//! Order endpoints (staff)

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
};
use shared::error::AppError;
use shared::models::{
    Invoice, Order, OrderCreate, OrderItem, OrderStatusChange, OrderStatusUpdate, OrderTotal,
    OrderUpdate,
};

use crate::state::AppState;

use super::{ApiResult, Json, RestaurantFilter, restaurants, tables};

/// Create an order after checking the table belongs to the restaurant.
pub(crate) async fn place_order(state: &AppState, req: OrderCreate) -> Result<Order, AppError> {
    restaurants::load(state, req.restaurant_id).await?;
    let table = tables::load(state, req.table_id).await?;
    if table.restaurant_id != req.restaurant_id {
        return Err(AppError::validation("Table does not belong to this restaurant")
            .with_detail("table_id", req.table_id)
            .with_detail("restaurant_id", req.restaurant_id));
    }
    Ok(state.orders.create_order(req).await?)
}

/// Apply an order update, checking a new table first.
pub(crate) async fn apply_update(
    state: &AppState,
    order_id: i64,
    changes: OrderUpdate,
) -> Result<Order, AppError> {
    if let Some(table_id) = changes.table_id {
        tables::load(state, table_id).await?;
    }
    Ok(state.orders.update_order(order_id, changes).await?)
}

/// GET /orders?restaurant_id=
pub async fn list_orders(
    State(state): State<AppState>,
    Query(filter): Query<RestaurantFilter>,
) -> ApiResult<Vec<Order>> {
    Ok(Json(state.orders.list_orders(filter.restaurant_id).await?))
}

/// GET /orders/{id}
pub async fn get_order(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Order> {
    Ok(Json(state.orders.get_order(id).await?))
}

/// POST /orders
pub async fn create_order(
    State(state): State<AppState>,
    Json(req): Json<OrderCreate>,
) -> Result<(StatusCode, Json<Order>), AppError> {
    let order = place_order(&state, req).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// PATCH /orders/{id}
pub async fn update_order(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(changes): Json<OrderUpdate>,
) -> ApiResult<Order> {
    Ok(Json(apply_update(&state, id, changes).await?))
}

/// PATCH /orders/{id}/status
pub async fn update_order_status(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<OrderStatusUpdate>,
) -> ApiResult<OrderStatusChange> {
    Ok(Json(state.orders.update_order_status(id, req.status).await?))
}

/// DELETE /orders/{id}
pub async fn delete_order(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    state.orders.delete_order(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /orders/{id}/items
pub async fn list_order_items(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Vec<OrderItem>> {
    Ok(Json(state.orders.list_items(id).await?))
}

/// GET /orders/{id}/total
///
/// Sum of the current item subtotals; an order without priced items is
/// `OrderEmpty`.
pub async fn get_order_total(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<OrderTotal> {
    let total_price = state.orders.recompute_order_total(id).await?;
    Ok(Json(OrderTotal {
        order_id: id,
        total_price,
    }))
}

/// GET /orders/{id}/invoice
pub async fn get_order_invoice(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Invoice> {
    Ok(Json(state.orders.invoice_for_order(id).await?))
}
