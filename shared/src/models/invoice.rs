//! Invoice Model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(type_name = "TEXT", rename_all = "lowercase"))]
pub enum InvoiceStatus {
    #[default]
    Pending,
    Paid,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(type_name = "TEXT", rename_all = "snake_case"))]
pub enum PaymentMethod {
    #[default]
    Cash,
    CreditCard,
    DebitCard,
    Online,
}

impl InvoiceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Paid => "paid",
        }
    }
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cash => "cash",
            Self::CreditCard => "credit_card",
            Self::DebitCard => "debit_card",
            Self::Online => "online",
        }
    }
}

/// Invoice entity. At most one per order; written only by order status
/// changes, never by clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Invoice {
    pub id: i64,
    pub order_id: i64,
    pub restaurant_id: i64,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub tax: Decimal,
    /// amount + tax
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
    pub status: InvoiceStatus,
    pub payment_method: PaymentMethod,
    pub created_at: i64,
    pub updated_at: i64,
}

/// One printed line of an invoice document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoiceLine {
    pub food_name: String,
    pub quantity: i32,
    #[serde(with = "rust_decimal::serde::float")]
    pub unit_price: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub subtotal: Decimal,
}

/// Printable invoice: header, lines and totals
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoiceDocument {
    pub invoice: Invoice,
    pub restaurant_name: String,
    pub restaurant_address: String,
    pub table_id: i64,
    pub order_date: i64,
    pub lines: Vec<InvoiceLine>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payment_method_wire_format() {
        let json = serde_json::to_string(&PaymentMethod::CreditCard).unwrap();
        assert_eq!(json, "\"credit_card\"");
        let json = serde_json::to_string(&InvoiceStatus::Paid).unwrap();
        assert_eq!(json, "\"paid\"");
        assert_eq!(PaymentMethod::CreditCard.as_str(), "credit_card");
        assert_eq!(InvoiceStatus::Paid.as_str(), "paid");
    }
}
