//! Public customer endpoints (no token)
//!
//! Customers browse the catalog, open an order at their table and manage its
//! items. Status changes stay with staff.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
};
use shared::error::AppError;
use shared::models::{
    DiningTable, Food, Menu, Order, OrderCreate, OrderItem, OrderItemCreate, OrderItemUpdate,
    OrderStatus, OrderUpdate, Restaurant,
};

use crate::db::{foods, menus};
use crate::state::AppState;

use super::{ApiResult, Json, RestaurantFilter, orders, restaurants, tables};

/// GET /customer/restaurants/{id}
pub async fn get_restaurant(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Restaurant> {
    Ok(Json(restaurants::load(&state, id).await?))
}

/// GET /customer/tables/{id}
pub async fn get_table(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<DiningTable> {
    Ok(Json(tables::load(&state, id).await?))
}

/// GET /customer/menus?restaurant_id=
pub async fn list_menus(
    State(state): State<AppState>,
    Query(filter): Query<RestaurantFilter>,
) -> ApiResult<Vec<Menu>> {
    let menus = menus::list(&state.pool, filter.restaurant_id).await?;
    Ok(Json(menus.into_iter().filter(|m| m.active).collect()))
}

/// GET /customer/foods?restaurant_id=
pub async fn list_foods(
    State(state): State<AppState>,
    Query(filter): Query<RestaurantFilter>,
) -> ApiResult<Vec<Food>> {
    let foods = foods::list(&state.pool, filter.restaurant_id).await?;
    Ok(Json(foods.into_iter().filter(|f| f.available).collect()))
}

/// POST /customer/orders
///
/// Always opens a `pending` order.
pub async fn create_order(
    State(state): State<AppState>,
    Json(req): Json<OrderCreate>,
) -> Result<(StatusCode, Json<Order>), AppError> {
    let req = OrderCreate {
        status: Some(OrderStatus::Pending),
        ..req
    };
    let order = orders::place_order(&state, req).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// PATCH /customer/orders/{id}
pub async fn update_order(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(changes): Json<OrderUpdate>,
) -> ApiResult<Order> {
    let changes = OrderUpdate {
        status: None,
        ..changes
    };
    Ok(Json(orders::apply_update(&state, id, changes).await?))
}

/// POST /customer/order-items
pub async fn add_item(
    State(state): State<AppState>,
    Json(req): Json<OrderItemCreate>,
) -> Result<(StatusCode, Json<OrderItem>), AppError> {
    let item = state
        .orders
        .attach_item(req.order_id, req.food_id, req.quantity)
        .await?;
    Ok((StatusCode::CREATED, Json(item)))
}

/// PATCH /customer/order-items/{id}
pub async fn update_item(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<OrderItemUpdate>,
) -> ApiResult<OrderItem> {
    Ok(Json(state.orders.update_item_quantity(id, req.quantity).await?))
}

/// DELETE /customer/order-items/{id}
pub async fn remove_item(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    state.orders.delete_item(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
