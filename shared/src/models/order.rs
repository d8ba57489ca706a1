//! Order and Order Item Models

use super::invoice::Invoice;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Order lifecycle status
///
/// Normal flow is `pending -> preparing -> ready -> served -> paid`;
/// `cancelled` can be reached from any status that is not terminal.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(type_name = "TEXT", rename_all = "snake_case"))]
pub enum OrderStatus {
    #[default]
    Pending,
    Preparing,
    Ready,
    Served,
    Paid,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Preparing => "preparing",
            Self::Ready => "ready",
            Self::Served => "served",
            Self::Paid => "paid",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Paid | Self::Cancelled)
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Order entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Order {
    pub id: i64,
    pub table_id: i64,
    pub restaurant_id: i64,
    /// Unix millis
    pub order_date: i64,
    /// Sum of item subtotals, refreshed on every item write and order update
    #[serde(with = "rust_decimal::serde::float")]
    pub total_price: Decimal,
    pub status: OrderStatus,
    pub notes: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
    /// Items ordered by id (populated by the repository, not a column)
    #[cfg_attr(feature = "db", sqlx(skip))]
    #[serde(default)]
    pub order_items: Vec<OrderItem>,
}

/// Line item of an order. `food_name` and `unit_price` are snapshots taken
/// when the item was attached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct OrderItem {
    pub id: i64,
    pub order_id: i64,
    pub food_id: i64,
    pub food_name: String,
    pub quantity: i32,
    #[serde(with = "rust_decimal::serde::float")]
    pub unit_price: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub subtotal: Decimal,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create order payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderCreate {
    pub table_id: i64,
    pub restaurant_id: i64,
    /// Defaults to now
    pub order_date: Option<i64>,
    /// Defaults to `pending`
    pub status: Option<OrderStatus>,
    pub notes: Option<String>,
}

/// Update order payload. The total is always recomputed from the items.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderUpdate {
    pub table_id: Option<i64>,
    pub order_date: Option<i64>,
    pub status: Option<OrderStatus>,
    pub notes: Option<String>,
}

/// Status change payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderStatusUpdate {
    pub status: OrderStatus,
}

/// Result of a status change: the order and its invoice after reconciliation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderStatusChange {
    pub order: Order,
    pub invoice: Option<Invoice>,
}

/// Freshly computed order total
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderTotal {
    pub order_id: i64,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_price: Decimal,
}

/// Attach item payload. A missing or zero quantity means 1.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItemCreate {
    pub order_id: i64,
    pub food_id: i64,
    pub quantity: Option<i32>,
}

/// Change item quantity payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItemUpdate {
    pub quantity: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_wire_format() {
        let json = serde_json::to_string(&OrderStatus::Preparing).unwrap();
        assert_eq!(json, "\"preparing\"");
        let status: OrderStatus = serde_json::from_str("\"cancelled\"").unwrap();
        assert_eq!(status, OrderStatus::Cancelled);
        assert!(serde_json::from_str::<OrderStatus>("\"done\"").is_err());
    }

    #[test]
    fn test_money_wire_format() {
        let item = OrderItem {
            id: 1,
            order_id: 1,
            food_id: 5,
            food_name: "Dumplings".into(),
            quantity: 2,
            unit_price: Decimal::new(950, 2),
            subtotal: Decimal::new(1900, 2),
            created_at: 0,
            updated_at: 0,
        };
        let value = serde_json::to_value(&item).unwrap();
        assert!(value["unit_price"].is_number());
        assert_eq!(value["unit_price"], serde_json::json!(9.5));
        assert_eq!(value["subtotal"], serde_json::json!(19.0));

        let back: OrderItem = serde_json::from_value(value).unwrap();
        assert_eq!(back.subtotal, Decimal::new(1900, 2));
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(OrderStatus::Paid.is_terminal());
        assert!(OrderStatus::Cancelled.is_terminal());
        assert!(!OrderStatus::Served.is_terminal());
        assert_eq!(OrderStatus::default(), OrderStatus::Pending);
    }

    #[test]
    fn test_order_items_default_to_empty() {
        let json = r#"{"id":1,"table_id":1,"restaurant_id":1,"order_date":0,
            "total_price":0.0,"status":"pending","notes":null,
            "created_at":0,"updated_at":0}"#;
        let order: Order = serde_json::from_str(json).unwrap();
        assert!(order.order_items.is_empty());
        assert_eq!(order.total_price, Decimal::ZERO);
    }
}
