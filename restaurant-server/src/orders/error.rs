//! Order subsystem errors

use shared::error::{AppError, ErrorCode};
use shared::models::OrderStatus;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OrderError {
    #[error("Order {0} not found")]
    OrderNotFound(i64),

    #[error("Order item {0} not found")]
    ItemNotFound(i64),

    #[error("Food {0} not found")]
    FoodNotFound(i64),

    #[error("No invoice for order {0}")]
    InvoiceNotFound(i64),

    #[error("Order {0} has no priced items")]
    Empty(i64),

    #[error("{0}")]
    InvalidQuantity(String),

    #[error("Order {0} would exceed the maximum total")]
    TotalTooLarge(i64),

    #[error("Cannot change order status from {from} to {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    #[error("Storage error: {0}")]
    Storage(#[from] sqlx::Error),
}

impl From<OrderError> for AppError {
    fn from(err: OrderError) -> Self {
        match &err {
            OrderError::OrderNotFound(id) => {
                AppError::with_message(ErrorCode::OrderNotFound, err.to_string())
                    .with_detail("order_id", *id)
            }
            OrderError::ItemNotFound(id) => {
                AppError::with_message(ErrorCode::OrderItemNotFound, err.to_string())
                    .with_detail("order_item_id", *id)
            }
            OrderError::FoodNotFound(id) => {
                AppError::with_message(ErrorCode::FoodNotFound, err.to_string())
                    .with_detail("food_id", *id)
            }
            OrderError::InvoiceNotFound(id) => {
                AppError::with_message(ErrorCode::InvoiceNotFound, err.to_string())
                    .with_detail("order_id", *id)
            }
            OrderError::Empty(id) => AppError::with_message(ErrorCode::OrderEmpty, err.to_string())
                .with_detail("order_id", *id),
            OrderError::InvalidQuantity(msg) => {
                AppError::with_message(ErrorCode::InvalidQuantity, msg.clone())
            }
            OrderError::TotalTooLarge(id) => {
                AppError::with_message(ErrorCode::OrderTotalTooLarge, err.to_string())
                    .with_detail("order_id", *id)
            }
            OrderError::InvalidTransition { from, to } => {
                AppError::with_message(ErrorCode::InvalidStatusTransition, err.to_string())
                    .with_detail("from", from.as_str())
                    .with_detail("to", to.as_str())
            }
            OrderError::Storage(e) => AppError::database(e.to_string()),
        }
    }
}
