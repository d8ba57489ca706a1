//! In-memory [`OrderStore`] for tests
//!
//! Each operation works on a copy of the state and commits it only on
//! success, which mirrors the transactional Postgres store.

use super::error::OrderError;
use super::invoice::{self, InvoiceAction};
use super::pricing;
use super::status::TransitionPolicy;
use super::store::{FoodSnapshot, NewOrder, NewOrderItem, OrderStore};
use async_trait::async_trait;
use rust_decimal::Decimal;
use shared::models::{
    Invoice, Order, OrderItem, OrderStatus, OrderStatusChange, OrderUpdate, PaymentMethod,
};
use std::collections::BTreeMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug, Clone, Default)]
struct State {
    next_id: i64,
    foods: BTreeMap<i64, FoodSnapshot>,
    orders: BTreeMap<i64, Order>,
    items: BTreeMap<i64, OrderItem>,
    invoices: BTreeMap<i64, Invoice>,
}

impl State {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn items_of(&self, order_id: i64) -> Vec<OrderItem> {
        self.items
            .values()
            .filter(|i| i.order_id == order_id)
            .cloned()
            .collect()
    }

    fn with_items(&self, order: &Order) -> Order {
        let mut order = order.clone();
        order.order_items = self.items_of(order.id);
        order
    }

    fn refresh_total(&mut self, order_id: i64, now: i64) {
        let total = pricing::sum_subtotals(&self.items_of(order_id));
        if let Some(order) = self.orders.get_mut(&order_id) {
            order.total_price = total;
            order.updated_at = now;
        }
    }
}

#[derive(Default)]
pub struct MemoryOrderStore {
    state: Mutex<State>,
    fail_invoice_writes: AtomicBool,
}

impl MemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_food(&self, id: i64, name: &str, price: Decimal) {
        let mut state = self.state.lock().unwrap();
        state.foods.insert(
            id,
            FoodSnapshot {
                id,
                name: name.to_string(),
                price,
            },
        );
        state.next_id = state.next_id.max(id);
    }

    /// Make every following invoice write fail
    pub fn fail_invoice_writes(&self) {
        self.fail_invoice_writes.store(true, Ordering::SeqCst);
    }

    /// Overwrite the payment method of the order's invoice, if any
    pub fn set_payment_method(&self, order_id: i64, method: PaymentMethod) {
        let mut state = self.state.lock().unwrap();
        if let Some(invoice) = state.invoices.values_mut().find(|i| i.order_id == order_id) {
            invoice.payment_method = method;
        }
    }

    pub fn invoice_count(&self) -> usize {
        self.state.lock().unwrap().invoices.len()
    }

    fn transact<T>(
        &self,
        f: impl FnOnce(&mut State) -> Result<T, OrderError>,
    ) -> Result<T, OrderError> {
        let mut guard = self.state.lock().unwrap();
        let mut draft = guard.clone();
        let out = f(&mut draft)?;
        *guard = draft;
        Ok(out)
    }

    fn read<T>(&self, f: impl FnOnce(&State) -> T) -> T {
        f(&self.state.lock().unwrap())
    }
}

#[async_trait]
impl OrderStore for MemoryOrderStore {
    async fn find_food(&self, food_id: i64) -> Result<Option<FoodSnapshot>, OrderError> {
        Ok(self.read(|s| s.foods.get(&food_id).cloned()))
    }

    async fn insert_order(&self, new: NewOrder) -> Result<Order, OrderError> {
        self.transact(|s| {
            let order = Order {
                id: s.next_id(),
                table_id: new.table_id,
                restaurant_id: new.restaurant_id,
                order_date: new.order_date,
                total_price: Decimal::ZERO,
                status: new.status,
                notes: new.notes,
                created_at: new.now,
                updated_at: new.now,
                order_items: Vec::new(),
            };
            s.orders.insert(order.id, order.clone());
            Ok(order)
        })
    }

    async fn find_order(&self, order_id: i64) -> Result<Option<Order>, OrderError> {
        Ok(self.read(|s| s.orders.get(&order_id).map(|o| s.with_items(o))))
    }

    async fn list_orders(&self, restaurant_id: Option<i64>) -> Result<Vec<Order>, OrderError> {
        Ok(self.read(|s| {
            let mut orders: Vec<Order> = s
                .orders
                .values()
                .filter(|o| restaurant_id.is_none_or(|r| o.restaurant_id == r))
                .map(|o| s.with_items(o))
                .collect();
            orders.sort_by(|a, b| b.order_date.cmp(&a.order_date));
            orders
        }))
    }

    async fn list_all_items(&self) -> Result<Vec<OrderItem>, OrderError> {
        Ok(self.read(|s| s.items.values().cloned().collect()))
    }

    async fn find_item(&self, item_id: i64) -> Result<Option<OrderItem>, OrderError> {
        Ok(self.read(|s| s.items.get(&item_id).cloned()))
    }

    async fn insert_item(&self, new: NewOrderItem) -> Result<OrderItem, OrderError> {
        self.transact(|s| {
            if !s.orders.contains_key(&new.order_id) {
                return Err(OrderError::OrderNotFound(new.order_id));
            }
            let item = OrderItem {
                id: s.next_id(),
                order_id: new.order_id,
                food_id: new.food_id,
                food_name: new.food_name,
                quantity: new.quantity,
                unit_price: new.unit_price,
                subtotal: new.subtotal,
                created_at: new.now,
                updated_at: new.now,
            };
            s.items.insert(item.id, item.clone());
            s.refresh_total(item.order_id, new.now);
            Ok(item)
        })
    }

    async fn update_item_quantity(
        &self,
        item_id: i64,
        quantity: i32,
        now: i64,
    ) -> Result<OrderItem, OrderError> {
        self.transact(|s| {
            let item = s
                .items
                .get_mut(&item_id)
                .ok_or(OrderError::ItemNotFound(item_id))?;
            item.quantity = quantity;
            item.subtotal = pricing::line_subtotal(item.unit_price, quantity);
            item.updated_at = now;
            let item = item.clone();
            s.refresh_total(item.order_id, now);
            Ok(item)
        })
    }

    async fn delete_item(&self, item_id: i64, now: i64) -> Result<(), OrderError> {
        self.transact(|s| {
            let item = s
                .items
                .remove(&item_id)
                .ok_or(OrderError::ItemNotFound(item_id))?;
            s.refresh_total(item.order_id, now);
            Ok(())
        })
    }

    async fn update_order(
        &self,
        order_id: i64,
        changes: &OrderUpdate,
        now: i64,
    ) -> Result<Order, OrderError> {
        self.transact(|s| {
            let items = s.items_of(order_id);
            let order = s
                .orders
                .get_mut(&order_id)
                .ok_or(OrderError::OrderNotFound(order_id))?;
            let total = pricing::order_total(order_id, &items)?;
            if let Some(table_id) = changes.table_id {
                order.table_id = table_id;
            }
            if let Some(order_date) = changes.order_date {
                order.order_date = order_date;
            }
            if let Some(status) = changes.status {
                order.status = status;
            }
            if let Some(notes) = &changes.notes {
                order.notes = Some(notes.clone());
            }
            order.total_price = total;
            order.updated_at = now;
            let mut order = order.clone();
            order.order_items = items;
            Ok(order)
        })
    }

    async fn change_status(
        &self,
        order_id: i64,
        next: OrderStatus,
        policy: TransitionPolicy,
        now: i64,
    ) -> Result<OrderStatusChange, OrderError> {
        let fail_invoice = self.fail_invoice_writes.load(Ordering::SeqCst);
        self.transact(|s| {
            let order = s
                .orders
                .get_mut(&order_id)
                .ok_or(OrderError::OrderNotFound(order_id))?;
            policy.check(order.status, next)?;
            order.status = next;
            order.updated_at = now;
            let order = order.clone();

            if fail_invoice {
                return Err(OrderError::Storage(sqlx::Error::PoolTimedOut));
            }

            let existing = s.invoices.values().find(|i| i.order_id == order_id).cloned();
            let invoice = match invoice::plan(&order) {
                InvoiceAction::Delete { .. } => {
                    if let Some(existing) = existing {
                        s.invoices.remove(&existing.id);
                    }
                    None
                }
                InvoiceAction::Upsert(draft) => {
                    let (id, created_at) = match existing {
                        Some(e) => (e.id, e.created_at),
                        None => (s.next_id(), now),
                    };
                    let invoice = Invoice {
                        id,
                        order_id: draft.order_id,
                        restaurant_id: draft.restaurant_id,
                        amount: draft.amount,
                        tax: draft.tax,
                        total: draft.total,
                        status: draft.status,
                        payment_method: draft.payment_method,
                        created_at,
                        updated_at: now,
                    };
                    s.invoices.insert(id, invoice.clone());
                    Some(invoice)
                }
            };

            Ok(OrderStatusChange {
                order: s.with_items(&order),
                invoice,
            })
        })
    }

    async fn delete_order(&self, order_id: i64) -> Result<(), OrderError> {
        self.transact(|s| {
            s.orders
                .remove(&order_id)
                .ok_or(OrderError::OrderNotFound(order_id))?;
            s.items.retain(|_, i| i.order_id != order_id);
            s.invoices.retain(|_, i| i.order_id != order_id);
            Ok(())
        })
    }

    async fn find_invoice(&self, invoice_id: i64) -> Result<Option<Invoice>, OrderError> {
        Ok(self.read(|s| s.invoices.get(&invoice_id).cloned()))
    }

    async fn find_invoice_by_order(&self, order_id: i64) -> Result<Option<Invoice>, OrderError> {
        Ok(self.read(|s| s.invoices.values().find(|i| i.order_id == order_id).cloned()))
    }

    async fn list_invoices(&self, restaurant_id: Option<i64>) -> Result<Vec<Invoice>, OrderError> {
        Ok(self.read(|s| {
            s.invoices
                .values()
                .filter(|i| restaurant_id.is_none_or(|r| i.restaurant_id == r))
                .cloned()
                .collect()
        }))
    }
}
