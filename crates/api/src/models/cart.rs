//! Cart domain types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use clementine_core::{CartItemId, ProductId};

/// A cart line as checkout reads it: the staged quantity joined with the
/// product's live price and stock.
///
/// Insertion order is preserved so order lines come out in the order the
/// customer added them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartLine {
    pub product_id: ProductId,
    pub quantity: i32,
    pub unit_price: Decimal,
    /// Stock available at the time of the read.
    pub stock_quantity: i32,
}

/// A cart item joined with product display data.
#[derive(Debug, Clone, Serialize)]
pub struct CartItemDetail {
    pub cart_id: CartItemId,
    pub quantity: i32,
    pub added_at: DateTime<Utc>,
    pub product_id: ProductId,
    pub product_name: String,
    pub price: Decimal,
    pub image_url: Option<String>,
    pub stock_quantity: i32,
}
