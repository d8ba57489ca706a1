//! Order, order item and invoice persistence
//!
//! Mutations lock the parent `orders` row first (`FOR UPDATE`) so concurrent
//! writers on the same order serialize and the total never goes stale.

use async_trait::async_trait;
use rust_decimal::Decimal;
use shared::models::{Invoice, Order, OrderItem, OrderStatus, OrderStatusChange, OrderUpdate};
use sqlx::{PgConnection, PgPool};
use std::collections::HashMap;

use crate::orders::OrderError;
use crate::orders::invoice::{self, InvoiceAction, InvoiceDraft};
use crate::orders::pricing;
use crate::orders::status::TransitionPolicy;
use crate::orders::store::{FoodSnapshot, NewOrder, NewOrderItem, OrderStore};

const ORDER_COLUMNS: &str = "id, table_id, restaurant_id, order_date, total_price, status, notes, created_at, updated_at";

#[derive(Clone)]
pub struct PgOrderStore {
    pool: PgPool,
}

impl PgOrderStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// ── Helpers (run inside the caller's transaction) ──

async fn lock_order(conn: &mut PgConnection, order_id: i64) -> Result<Order, OrderError> {
    let sql = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1 FOR UPDATE");
    sqlx::query_as::<_, Order>(&sql)
        .bind(order_id)
        .fetch_optional(conn)
        .await?
        .ok_or(OrderError::OrderNotFound(order_id))
}

async fn items_of(conn: &mut PgConnection, order_id: i64) -> Result<Vec<OrderItem>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM orderitems WHERE order_id = $1 ORDER BY id")
        .bind(order_id)
        .fetch_all(conn)
        .await
}

/// Set `total_price` to the sum of the order's item subtotals (0 when empty).
async fn refresh_total(conn: &mut PgConnection, order_id: i64, now: i64) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE orders SET
            total_price = COALESCE((SELECT SUM(subtotal) FROM orderitems WHERE order_id = $1), 0),
            updated_at = $2
        WHERE id = $1
        "#,
    )
    .bind(order_id)
    .bind(now)
    .execute(conn)
    .await?;
    Ok(())
}

/// Every column but `order_id` and `created_at` is overwritten on conflict.
const UPSERT_INVOICE: &str = r#"
    INSERT INTO invoices (
        order_id, restaurant_id, amount, tax, total, status, payment_method, created_at, updated_at
    )
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8)
    ON CONFLICT (order_id)
    DO UPDATE SET
        restaurant_id = EXCLUDED.restaurant_id, amount = EXCLUDED.amount,
        tax = EXCLUDED.tax, total = EXCLUDED.total, status = EXCLUDED.status,
        payment_method = EXCLUDED.payment_method, updated_at = EXCLUDED.updated_at
    RETURNING *
"#;

async fn upsert_invoice(
    conn: &mut PgConnection,
    draft: &InvoiceDraft,
    now: i64,
) -> Result<Invoice, sqlx::Error> {
    sqlx::query_as(UPSERT_INVOICE)
    .bind(draft.order_id)
    .bind(draft.restaurant_id)
    .bind(draft.amount)
    .bind(draft.tax)
    .bind(draft.total)
    .bind(draft.status)
    .bind(draft.payment_method)
    .bind(now)
    .fetch_one(conn)
    .await
}

/// Attach items to each order, keeping the orders' sequence.
async fn with_items(pool: &PgPool, mut orders: Vec<Order>) -> Result<Vec<Order>, sqlx::Error> {
    if orders.is_empty() {
        return Ok(orders);
    }
    let ids: Vec<i64> = orders.iter().map(|o| o.id).collect();
    let items: Vec<OrderItem> =
        sqlx::query_as("SELECT * FROM orderitems WHERE order_id = ANY($1) ORDER BY id")
            .bind(&ids)
            .fetch_all(pool)
            .await?;

    let mut grouped: HashMap<i64, Vec<OrderItem>> = HashMap::new();
    for item in items {
        grouped.entry(item.order_id).or_default().push(item);
    }
    for order in &mut orders {
        order.order_items = grouped.remove(&order.id).unwrap_or_default();
    }
    Ok(orders)
}

#[async_trait]
impl OrderStore for PgOrderStore {
    async fn find_food(&self, food_id: i64) -> Result<Option<FoodSnapshot>, OrderError> {
        let row: Option<(i64, String, Decimal)> =
            sqlx::query_as("SELECT id, name, price FROM foods WHERE id = $1")
                .bind(food_id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(|(id, name, price)| FoodSnapshot { id, name, price }))
    }

    async fn insert_order(&self, new: NewOrder) -> Result<Order, OrderError> {
        let sql = format!(
            r#"
            INSERT INTO orders (table_id, restaurant_id, order_date, total_price, status, notes, created_at, updated_at)
            VALUES ($1, $2, $3, 0, $4, $5, $6, $6)
            RETURNING {ORDER_COLUMNS}
            "#
        );
        let order = sqlx::query_as::<_, Order>(&sql)
            .bind(new.table_id)
            .bind(new.restaurant_id)
            .bind(new.order_date)
            .bind(new.status)
            .bind(&new.notes)
            .bind(new.now)
            .fetch_one(&self.pool)
            .await?;
        Ok(order)
    }

    async fn find_order(&self, order_id: i64) -> Result<Option<Order>, OrderError> {
        let sql = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1");
        let order: Option<Order> = sqlx::query_as(&sql)
            .bind(order_id)
            .fetch_optional(&self.pool)
            .await?;
        match order {
            Some(order) => Ok(with_items(&self.pool, vec![order]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn list_orders(&self, restaurant_id: Option<i64>) -> Result<Vec<Order>, OrderError> {
        let sql = format!(
            r#"
            SELECT {ORDER_COLUMNS} FROM orders
            WHERE ($1::BIGINT IS NULL OR restaurant_id = $1)
            ORDER BY order_date DESC, id DESC
            "#
        );
        let orders: Vec<Order> = sqlx::query_as(&sql)
            .bind(restaurant_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(with_items(&self.pool, orders).await?)
    }

    async fn list_all_items(&self) -> Result<Vec<OrderItem>, OrderError> {
        let items = sqlx::query_as("SELECT * FROM orderitems ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(items)
    }

    async fn find_item(&self, item_id: i64) -> Result<Option<OrderItem>, OrderError> {
        let item = sqlx::query_as("SELECT * FROM orderitems WHERE id = $1")
            .bind(item_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(item)
    }

    async fn insert_item(&self, new: NewOrderItem) -> Result<OrderItem, OrderError> {
        let mut tx = self.pool.begin().await?;
        lock_order(&mut tx, new.order_id).await?;

        let item: OrderItem = sqlx::query_as(
            r#"
            INSERT INTO orderitems (
                order_id, food_id, food_name, quantity, unit_price, subtotal, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $7)
            RETURNING *
            "#,
        )
        .bind(new.order_id)
        .bind(new.food_id)
        .bind(&new.food_name)
        .bind(new.quantity)
        .bind(new.unit_price)
        .bind(new.subtotal)
        .bind(new.now)
        .fetch_one(&mut *tx)
        .await?;

        refresh_total(&mut tx, new.order_id, new.now).await?;
        tx.commit().await?;
        Ok(item)
    }

    async fn update_item_quantity(
        &self,
        item_id: i64,
        quantity: i32,
        now: i64,
    ) -> Result<OrderItem, OrderError> {
        let current = self
            .find_item(item_id)
            .await?
            .ok_or(OrderError::ItemNotFound(item_id))?;

        let mut tx = self.pool.begin().await?;
        lock_order(&mut tx, current.order_id).await?;

        let item: OrderItem = sqlx::query_as(
            r#"
            UPDATE orderitems SET quantity = $1, subtotal = $2, updated_at = $3
            WHERE id = $4 AND order_id = $5
            RETURNING *
            "#,
        )
        .bind(quantity)
        .bind(pricing::line_subtotal(current.unit_price, quantity))
        .bind(now)
        .bind(item_id)
        .bind(current.order_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(OrderError::ItemNotFound(item_id))?;

        refresh_total(&mut tx, item.order_id, now).await?;
        tx.commit().await?;
        Ok(item)
    }

    async fn delete_item(&self, item_id: i64, now: i64) -> Result<(), OrderError> {
        let current = self
            .find_item(item_id)
            .await?
            .ok_or(OrderError::ItemNotFound(item_id))?;

        let mut tx = self.pool.begin().await?;
        lock_order(&mut tx, current.order_id).await?;

        let result = sqlx::query("DELETE FROM orderitems WHERE id = $1 AND order_id = $2")
            .bind(item_id)
            .bind(current.order_id)
            .execute(&mut *tx)
            .await?;
        if result.rows_affected() == 0 {
            return Err(OrderError::ItemNotFound(item_id));
        }

        refresh_total(&mut tx, current.order_id, now).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn update_order(
        &self,
        order_id: i64,
        changes: &OrderUpdate,
        now: i64,
    ) -> Result<Order, OrderError> {
        let mut tx = self.pool.begin().await?;
        lock_order(&mut tx, order_id).await?;

        let items = items_of(&mut tx, order_id).await?;
        let total = pricing::order_total(order_id, &items)?;

        let sql = format!(
            r#"
            UPDATE orders SET
                table_id = COALESCE($1, table_id),
                order_date = COALESCE($2, order_date),
                status = COALESCE($3, status),
                notes = COALESCE($4, notes),
                total_price = $5,
                updated_at = $6
            WHERE id = $7
            RETURNING {ORDER_COLUMNS}
            "#
        );
        let mut order: Order = sqlx::query_as(&sql)
            .bind(changes.table_id)
            .bind(changes.order_date)
            .bind(changes.status)
            .bind(&changes.notes)
            .bind(total)
            .bind(now)
            .bind(order_id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        order.order_items = items;
        Ok(order)
    }

    async fn change_status(
        &self,
        order_id: i64,
        next: OrderStatus,
        policy: TransitionPolicy,
        now: i64,
    ) -> Result<OrderStatusChange, OrderError> {
        let mut tx = self.pool.begin().await?;
        let current = lock_order(&mut tx, order_id).await?;
        policy.check(current.status, next)?;

        let sql = format!(
            "UPDATE orders SET status = $1, updated_at = $2 WHERE id = $3 RETURNING {ORDER_COLUMNS}"
        );
        let mut order: Order = sqlx::query_as(&sql)
            .bind(next)
            .bind(now)
            .bind(order_id)
            .fetch_one(&mut *tx)
            .await?;
        order.order_items = items_of(&mut tx, order_id).await?;

        let invoice = match invoice::plan(&order) {
            InvoiceAction::Delete { order_id } => {
                // Nothing to delete is fine
                sqlx::query("DELETE FROM invoices WHERE order_id = $1")
                    .bind(order_id)
                    .execute(&mut *tx)
                    .await?;
                None
            }
            InvoiceAction::Upsert(draft) => Some(upsert_invoice(&mut tx, &draft, now).await?),
        };

        tx.commit().await?;
        Ok(OrderStatusChange { order, invoice })
    }

    async fn delete_order(&self, order_id: i64) -> Result<(), OrderError> {
        // Items and invoice go with the order (ON DELETE CASCADE)
        let result = sqlx::query("DELETE FROM orders WHERE id = $1")
            .bind(order_id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(OrderError::OrderNotFound(order_id));
        }
        Ok(())
    }

    async fn find_invoice(&self, invoice_id: i64) -> Result<Option<Invoice>, OrderError> {
        let invoice = sqlx::query_as("SELECT * FROM invoices WHERE id = $1")
            .bind(invoice_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(invoice)
    }

    async fn find_invoice_by_order(&self, order_id: i64) -> Result<Option<Invoice>, OrderError> {
        let invoice = sqlx::query_as("SELECT * FROM invoices WHERE order_id = $1")
            .bind(order_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(invoice)
    }

    async fn list_invoices(&self, restaurant_id: Option<i64>) -> Result<Vec<Invoice>, OrderError> {
        let invoices = sqlx::query_as(
            r#"
            SELECT * FROM invoices
            WHERE ($1::BIGINT IS NULL OR restaurant_id = $1)
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(restaurant_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(invoices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invoice_upsert_overwrites_every_mutable_column() {
        let (insert, update) = UPSERT_INVOICE
            .split_once("DO UPDATE SET")
            .expect("upsert has a conflict clause");
        let columns = insert
            .split_once('(')
            .and_then(|(_, rest)| rest.split_once(')'))
            .map(|(cols, _)| cols)
            .expect("insert column list");

        for column in columns.split(',').map(str::trim) {
            let assignment = format!("{column} = EXCLUDED.{column}");
            if matches!(column, "order_id" | "created_at") {
                assert!(!update.contains(&assignment), "{column} must be kept");
            } else {
                assert!(update.contains(&assignment), "{column} is not updated");
            }
        }
    }
}
