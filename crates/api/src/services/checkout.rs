//! Checkout business rules.
//!
//! The pure parts of the checkout workflow: cart validation and total
//! computation. The transaction itself lives in
//! [`crate::db::orders::OrderRepository::create_from_cart`], which calls
//! these functions between its reads and writes so that any violation aborts
//! the transaction before a single row is written.

use rust_decimal::Decimal;
use thiserror::Error;

use clementine_core::{ProductId, order_total};

use crate::db::RepositoryError;
use crate::models::cart::CartLine;

/// Errors that can abort a checkout.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// The caller's cart has no lines. An empty cart never becomes an order.
    #[error("cart is empty")]
    EmptyCart,

    /// A line requests more than the available stock. Partial orders are
    /// forbidden; the first violation aborts the whole checkout.
    #[error("insufficient stock for product {0}")]
    InsufficientStock(ProductId),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Validate a cart for checkout: non-empty, and every line satisfiable from
/// the stock read in the same transaction.
///
/// # Errors
///
/// Returns `CheckoutError::EmptyCart` for an empty cart, or
/// `CheckoutError::InsufficientStock` naming the first offending product.
pub fn validate_cart(lines: &[CartLine]) -> Result<(), CheckoutError> {
    if lines.is_empty() {
        return Err(CheckoutError::EmptyCart);
    }

    for line in lines {
        if line.stock_quantity < line.quantity {
            return Err(CheckoutError::InsufficientStock(line.product_id));
        }
    }

    Ok(())
}

/// Total of the cart: sum of line extended prices, rounded to 2 decimal
/// places.
#[must_use]
pub fn checkout_total(lines: &[CartLine]) -> Decimal {
    order_total(lines.iter().map(|line| (line.unit_price, line.quantity)))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use clementine_core::format_amount;

    fn line(product_id: i32, quantity: i32, unit_price: &str, stock: i32) -> CartLine {
        CartLine {
            product_id: ProductId::new(product_id),
            quantity,
            unit_price: unit_price.parse().unwrap(),
            stock_quantity: stock,
        }
    }

    #[test]
    fn test_empty_cart_is_rejected() {
        assert!(matches!(validate_cart(&[]), Err(CheckoutError::EmptyCart)));
    }

    #[test]
    fn test_sufficient_stock_passes() {
        let lines = [line(1, 2, "10.00", 5), line(2, 1, "5.00", 5)];
        assert!(validate_cart(&lines).is_ok());
    }

    #[test]
    fn test_exact_stock_passes() {
        let lines = [line(1, 5, "10.00", 5)];
        assert!(validate_cart(&lines).is_ok());
    }

    #[test]
    fn test_first_violation_names_offending_product() {
        let lines = [
            line(1, 2, "10.00", 5),
            line(7, 3, "4.00", 2),
            line(9, 10, "1.00", 0),
        ];
        assert!(matches!(
            validate_cart(&lines),
            Err(CheckoutError::InsufficientStock(id)) if id == ProductId::new(7)
        ));
    }

    #[test]
    fn test_checkout_total_example() {
        // [{qty 2, price 10.00}, {qty 1, price 5.00}] -> 25.00
        let lines = [line(1, 2, "10.00", 5), line(2, 1, "5.00", 5)];
        assert_eq!(format_amount(checkout_total(&lines)), "25.00");
    }

    #[test]
    fn test_checkout_total_rounds() {
        let lines = [line(1, 3, "3.333", 10)];
        assert_eq!(format_amount(checkout_total(&lines)), "10.00");
    }
}
