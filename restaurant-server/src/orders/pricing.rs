//! Money and quantity rules for order items
//!
//! All amounts are `Decimal` rounded to 2 places (half away from zero) before
//! they are stored or compared.

use super::error::OrderError;
use rust_decimal::prelude::*;
use shared::models::OrderItem;

const DECIMAL_PLACES: u32 = 2;

/// Maximum allowed quantity per item
pub const MAX_QUANTITY: i32 = 9999;

/// Maximum unit price of a food (99,999.99)
pub const MAX_PRICE: Decimal = Decimal::from_parts(9_999_999, 0, 0, false, 2);

/// Maximum order total (1,000,000,000)
pub const MAX_ORDER_TOTAL: Decimal = Decimal::from_parts(1_000_000_000, 0, 0, false, 0);

/// Round to currency precision
pub fn to_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// Quantity for a newly attached item: absent or zero means one.
pub fn normalize_quantity(quantity: Option<i32>) -> Result<i32, OrderError> {
    match quantity {
        None | Some(0) => Ok(1),
        Some(q) => validate_quantity(q),
    }
}

/// Quantity for an existing item: must be strictly positive.
pub fn validate_quantity(quantity: i32) -> Result<i32, OrderError> {
    if quantity <= 0 {
        return Err(OrderError::InvalidQuantity(format!(
            "quantity must be positive, got {quantity}"
        )));
    }
    if quantity > MAX_QUANTITY {
        return Err(OrderError::InvalidQuantity(format!(
            "quantity exceeds maximum allowed ({MAX_QUANTITY}), got {quantity}"
        )));
    }
    Ok(quantity)
}

/// unit_price x quantity
pub fn line_subtotal(unit_price: Decimal, quantity: i32) -> Decimal {
    to_money(unit_price * Decimal::from(quantity))
}

/// Sum of item subtotals (zero for no items)
pub fn sum_subtotals(items: &[OrderItem]) -> Decimal {
    to_money(items.iter().map(|item| item.subtotal).sum())
}

/// Reject an item write that would push the order total past [`MAX_ORDER_TOTAL`].
pub fn check_order_total(order_id: i64, total: Decimal) -> Result<(), OrderError> {
    if total > MAX_ORDER_TOTAL {
        return Err(OrderError::TotalTooLarge(order_id));
    }
    Ok(())
}

/// Total used when an order is updated. An order without a positive total
/// is considered empty.
pub fn order_total(order_id: i64, items: &[OrderItem]) -> Result<Decimal, OrderError> {
    let total = sum_subtotals(items);
    if items.is_empty() || total <= Decimal::ZERO {
        return Err(OrderError::Empty(order_id));
    }
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn item(id: i64, unit_price: Decimal, quantity: i32) -> OrderItem {
        OrderItem {
            id,
            order_id: 1,
            food_id: id,
            food_name: format!("food-{id}"),
            quantity,
            unit_price,
            subtotal: line_subtotal(unit_price, quantity),
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn test_normalize_quantity_defaults_to_one() {
        assert_eq!(normalize_quantity(None).unwrap(), 1);
        assert_eq!(normalize_quantity(Some(0)).unwrap(), 1);
        assert_eq!(normalize_quantity(Some(3)).unwrap(), 3);
    }

    #[test]
    fn test_negative_quantity_rejected() {
        assert!(matches!(
            normalize_quantity(Some(-2)),
            Err(OrderError::InvalidQuantity(_))
        ));
        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(MAX_QUANTITY + 1).is_err());
        assert_eq!(validate_quantity(MAX_QUANTITY).unwrap(), MAX_QUANTITY);
    }

    #[test]
    fn test_line_subtotal_exact() {
        assert_eq!(line_subtotal(dec!(9.50), 2), dec!(19.00));
        assert_eq!(line_subtotal(dec!(0.10), 3), dec!(0.30));
        assert_eq!(line_subtotal(dec!(12.345), 1), dec!(12.35));
    }

    #[test]
    fn test_order_total_sums_subtotals() {
        let items = vec![item(1, dec!(9.50), 2), item(2, dec!(3.25), 3)];
        assert_eq!(order_total(1, &items).unwrap(), dec!(28.75));
    }

    #[test]
    fn test_empty_order_has_no_total() {
        assert!(matches!(order_total(7, &[]), Err(OrderError::Empty(7))));
        assert_eq!(sum_subtotals(&[]), Decimal::ZERO);

        let free = vec![item(1, Decimal::ZERO, 2)];
        assert!(matches!(order_total(7, &free), Err(OrderError::Empty(7))));
    }

    #[test]
    fn test_largest_line_fits_under_order_cap() {
        assert_eq!(MAX_PRICE, dec!(99999.99));
        let largest = line_subtotal(MAX_PRICE, MAX_QUANTITY);
        assert_eq!(largest, dec!(999899900.01));
        assert!(check_order_total(1, largest).is_ok());
        assert!(check_order_total(1, MAX_ORDER_TOTAL).is_ok());
        assert!(matches!(
            check_order_total(4, MAX_ORDER_TOTAL + dec!(0.01)),
            Err(OrderError::TotalTooLarge(4))
        ));
    }
}
