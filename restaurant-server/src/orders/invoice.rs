//! Invoice reconciliation
//!
//! Each order status maps to exactly one invoice action. Applying the action
//! is the store's job; it runs in the same transaction as the status write.

use super::pricing::to_money;
use rust_decimal::Decimal;
use shared::models::{
    Invoice, InvoiceDocument, InvoiceLine, InvoiceStatus, Order, OrderStatus, PaymentMethod,
    Restaurant,
};

/// Invoice fields derived from an order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceDraft {
    pub order_id: i64,
    pub restaurant_id: i64,
    pub amount: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
    pub status: InvoiceStatus,
    pub payment_method: PaymentMethod,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvoiceAction {
    /// Insert, or overwrite the order's existing invoice in place
    Upsert(InvoiceDraft),
    /// Remove the order's invoice if there is one
    Delete { order_id: i64 },
}

/// Decide what the order's invoice must look like for its current status.
pub fn plan(order: &Order) -> InvoiceAction {
    let status = match order.status {
        OrderStatus::Pending | OrderStatus::Cancelled => {
            return InvoiceAction::Delete { order_id: order.id };
        }
        OrderStatus::Paid => InvoiceStatus::Paid,
        OrderStatus::Preparing | OrderStatus::Ready | OrderStatus::Served => InvoiceStatus::Pending,
    };

    let amount = to_money(order.total_price);
    let tax = Decimal::ZERO;
    InvoiceAction::Upsert(InvoiceDraft {
        order_id: order.id,
        restaurant_id: order.restaurant_id,
        amount,
        tax,
        total: to_money(amount + tax),
        status,
        payment_method: PaymentMethod::Cash,
    })
}

/// Assemble the printable invoice for an order.
pub fn document(invoice: Invoice, order: &Order, restaurant: &Restaurant) -> InvoiceDocument {
    InvoiceDocument {
        lines: order
            .order_items
            .iter()
            .map(|item| InvoiceLine {
                food_name: item.food_name.clone(),
                quantity: item.quantity,
                unit_price: item.unit_price,
                subtotal: item.subtotal,
            })
            .collect(),
        restaurant_name: restaurant.name.clone(),
        restaurant_address: restaurant.address.clone(),
        table_id: order.table_id,
        order_date: order.order_date,
        invoice,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn order(status: OrderStatus, total: Decimal) -> Order {
        Order {
            id: 42,
            table_id: 1,
            restaurant_id: 7,
            order_date: 0,
            total_price: total,
            status,
            notes: None,
            created_at: 0,
            updated_at: 0,
            order_items: Vec::new(),
        }
    }

    #[test]
    fn test_kitchen_statuses_upsert_pending_cash() {
        for status in [OrderStatus::Preparing, OrderStatus::Ready, OrderStatus::Served] {
            let action = plan(&order(status, dec!(19.00)));
            assert_eq!(
                action,
                InvoiceAction::Upsert(InvoiceDraft {
                    order_id: 42,
                    restaurant_id: 7,
                    amount: dec!(19.00),
                    tax: dec!(0.00),
                    total: dec!(19.00),
                    status: InvoiceStatus::Pending,
                    payment_method: PaymentMethod::Cash,
                })
            );
        }
    }

    #[test]
    fn test_paid_upserts_paid_invoice() {
        let InvoiceAction::Upsert(draft) = plan(&order(OrderStatus::Paid, dec!(19.00))) else {
            panic!("paid order must keep an invoice");
        };
        assert_eq!(draft.status, InvoiceStatus::Paid);
        assert_eq!(draft.total, dec!(19.00));
    }

    #[test]
    fn test_open_or_cancelled_deletes() {
        assert_eq!(
            plan(&order(OrderStatus::Pending, dec!(19.00))),
            InvoiceAction::Delete { order_id: 42 }
        );
        assert_eq!(
            plan(&order(OrderStatus::Cancelled, dec!(19.00))),
            InvoiceAction::Delete { order_id: 42 }
        );
    }

    #[test]
    fn test_plan_is_deterministic() {
        let o = order(OrderStatus::Served, dec!(12.5));
        assert_eq!(plan(&o), plan(&o));
    }
}
