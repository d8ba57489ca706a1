//! Order lifecycle: creation, items, totals, status and invoices

use super::error::OrderError;
use super::pricing;
use super::status::TransitionPolicy;
use super::store::{NewOrder, NewOrderItem, OrderStore};
use rust_decimal::Decimal;
use shared::models::{
    Invoice, Order, OrderCreate, OrderItem, OrderStatus, OrderStatusChange, OrderUpdate,
};
use shared::util::now_millis;
use std::sync::Arc;

#[derive(Clone)]
pub struct OrderService {
    store: Arc<dyn OrderStore>,
    policy: TransitionPolicy,
}

impl OrderService {
    pub fn new(store: Arc<dyn OrderStore>, policy: TransitionPolicy) -> Self {
        Self { store, policy }
    }

    /// Persist an order shell with a zero total.
    pub async fn create_order(&self, req: OrderCreate) -> Result<Order, OrderError> {
        let now = now_millis();
        let order = self
            .store
            .insert_order(NewOrder {
                table_id: req.table_id,
                restaurant_id: req.restaurant_id,
                order_date: req.order_date.unwrap_or(now),
                status: req.status.unwrap_or_default(),
                notes: req.notes,
                now,
            })
            .await?;
        tracing::info!(order_id = order.id, table_id = order.table_id, "Order created");
        Ok(order)
    }

    pub async fn get_order(&self, order_id: i64) -> Result<Order, OrderError> {
        self.store
            .find_order(order_id)
            .await?
            .ok_or(OrderError::OrderNotFound(order_id))
    }

    pub async fn list_orders(&self, restaurant_id: Option<i64>) -> Result<Vec<Order>, OrderError> {
        self.store.list_orders(restaurant_id).await
    }

    /// Attach a food to an order, snapshotting its name and price.
    pub async fn attach_item(
        &self,
        order_id: i64,
        food_id: i64,
        quantity: Option<i32>,
    ) -> Result<OrderItem, OrderError> {
        let quantity = pricing::normalize_quantity(quantity)?;
        let food = self
            .store
            .find_food(food_id)
            .await?
            .ok_or(OrderError::FoodNotFound(food_id))?;

        let order = self.get_order(order_id).await?;

        let unit_price = pricing::to_money(food.price);
        let subtotal = pricing::line_subtotal(unit_price, quantity);
        pricing::check_order_total(order_id, order.total_price + subtotal)?;

        let item = self
            .store
            .insert_item(NewOrderItem {
                order_id,
                food_id: food.id,
                food_name: food.name,
                quantity,
                unit_price,
                subtotal,
                now: now_millis(),
            })
            .await?;
        tracing::info!(order_id, item_id = item.id, food_id, quantity, "Item attached");
        Ok(item)
    }

    pub async fn update_item_quantity(
        &self,
        item_id: i64,
        quantity: i32,
    ) -> Result<OrderItem, OrderError> {
        let quantity = pricing::validate_quantity(quantity)?;
        let item = self.get_item(item_id).await?;
        let order = self.get_order(item.order_id).await?;
        let subtotal = pricing::line_subtotal(item.unit_price, quantity);
        pricing::check_order_total(order.id, order.total_price - item.subtotal + subtotal)?;

        self.store
            .update_item_quantity(item_id, quantity, now_millis())
            .await
    }

    pub async fn delete_item(&self, item_id: i64) -> Result<(), OrderError> {
        self.store.delete_item(item_id, now_millis()).await
    }

    pub async fn get_item(&self, item_id: i64) -> Result<OrderItem, OrderError> {
        self.store
            .find_item(item_id)
            .await?
            .ok_or(OrderError::ItemNotFound(item_id))
    }

    pub async fn list_items(&self, order_id: i64) -> Result<Vec<OrderItem>, OrderError> {
        self.get_order(order_id).await.map(|order| order.order_items)
    }

    pub async fn list_all_items(&self) -> Result<Vec<OrderItem>, OrderError> {
        self.store.list_all_items().await
    }

    /// Sum of the order's current item subtotals.
    pub async fn recompute_order_total(&self, order_id: i64) -> Result<Decimal, OrderError> {
        let order = self.get_order(order_id).await?;
        pricing::order_total(order_id, &order.order_items)
    }

    /// Apply field changes; the stored total is always recomputed from the items.
    pub async fn update_order(
        &self,
        order_id: i64,
        changes: OrderUpdate,
    ) -> Result<Order, OrderError> {
        let order = self
            .store
            .update_order(order_id, &changes, now_millis())
            .await?;
        tracing::info!(order_id, total = %order.total_price, "Order updated");
        Ok(order)
    }

    /// Change status and bring the invoice in line with it.
    pub async fn update_order_status(
        &self,
        order_id: i64,
        status: OrderStatus,
    ) -> Result<OrderStatusChange, OrderError> {
        let change = self
            .store
            .change_status(order_id, status, self.policy, now_millis())
            .await?;
        tracing::info!(
            order_id,
            status = %status,
            invoice_id = change.invoice.as_ref().map(|i| i.id),
            "Order status changed"
        );
        Ok(change)
    }

    pub async fn delete_order(&self, order_id: i64) -> Result<(), OrderError> {
        self.store.delete_order(order_id).await?;
        tracing::info!(order_id, "Order deleted");
        Ok(())
    }

    pub async fn get_invoice(&self, invoice_id: i64) -> Result<Invoice, OrderError> {
        self.store
            .find_invoice(invoice_id)
            .await?
            .ok_or(OrderError::InvoiceNotFound(invoice_id))
    }

    pub async fn invoice_for_order(&self, order_id: i64) -> Result<Invoice, OrderError> {
        self.get_order(order_id).await?;
        self.store
            .find_invoice_by_order(order_id)
            .await?
            .ok_or(OrderError::InvoiceNotFound(order_id))
    }

    pub async fn list_invoices(
        &self,
        restaurant_id: Option<i64>,
    ) -> Result<Vec<Invoice>, OrderError> {
        self.store.list_invoices(restaurant_id).await
    }
}
