//! Persistence seam for the order lifecycle
//!
//! Every mutating method is atomic: an implementation either applies all of
//! its writes (item, order total, invoice) or none of them.

use super::error::OrderError;
use super::status::TransitionPolicy;
use async_trait::async_trait;
use rust_decimal::Decimal;
use shared::models::{Invoice, Order, OrderItem, OrderStatus, OrderStatusChange, OrderUpdate};

/// The food fields an order item snapshots
#[derive(Debug, Clone)]
pub struct FoodSnapshot {
    pub id: i64,
    pub name: String,
    pub price: Decimal,
}

#[derive(Debug, Clone)]
pub struct NewOrder {
    pub table_id: i64,
    pub restaurant_id: i64,
    pub order_date: i64,
    pub status: OrderStatus,
    pub notes: Option<String>,
    pub now: i64,
}

#[derive(Debug, Clone)]
pub struct NewOrderItem {
    pub order_id: i64,
    pub food_id: i64,
    pub food_name: String,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub subtotal: Decimal,
    pub now: i64,
}

#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn find_food(&self, food_id: i64) -> Result<Option<FoodSnapshot>, OrderError>;

    async fn insert_order(&self, order: NewOrder) -> Result<Order, OrderError>;

    /// Order with its items
    async fn find_order(&self, order_id: i64) -> Result<Option<Order>, OrderError>;

    /// Orders (with items), newest `order_date` first
    async fn list_orders(&self, restaurant_id: Option<i64>) -> Result<Vec<Order>, OrderError>;

    async fn list_all_items(&self) -> Result<Vec<OrderItem>, OrderError>;

    async fn find_item(&self, item_id: i64) -> Result<Option<OrderItem>, OrderError>;

    /// Insert the item and refresh the order's total.
    async fn insert_item(&self, item: NewOrderItem) -> Result<OrderItem, OrderError>;

    /// Set a new quantity, recompute the subtotal from the stored unit price
    /// and refresh the order's total.
    async fn update_item_quantity(
        &self,
        item_id: i64,
        quantity: i32,
        now: i64,
    ) -> Result<OrderItem, OrderError>;

    /// Delete the item and refresh the order's total.
    async fn delete_item(&self, item_id: i64, now: i64) -> Result<(), OrderError>;

    /// Apply field changes and the recomputed total. Fails with
    /// [`OrderError::Empty`] when the items do not sum to a positive amount.
    async fn update_order(
        &self,
        order_id: i64,
        changes: &OrderUpdate,
        now: i64,
    ) -> Result<Order, OrderError>;

    /// Write the new status and reconcile the invoice in one unit of work.
    async fn change_status(
        &self,
        order_id: i64,
        next: OrderStatus,
        policy: TransitionPolicy,
        now: i64,
    ) -> Result<OrderStatusChange, OrderError>;

    /// Delete the order together with its items and invoice.
    async fn delete_order(&self, order_id: i64) -> Result<(), OrderError>;

    async fn find_invoice(&self, invoice_id: i64) -> Result<Option<Invoice>, OrderError>;

    async fn find_invoice_by_order(&self, order_id: i64) -> Result<Option<Invoice>, OrderError>;

    async fn list_invoices(&self, restaurant_id: Option<i64>) -> Result<Vec<Invoice>, OrderError>;
}
