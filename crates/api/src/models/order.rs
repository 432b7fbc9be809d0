//! Order domain types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use clementine_core::{AddressId, OrderId, OrderItemId, OrderStatus, ProductId, UserId};

/// An order header.
///
/// Immutable once written except for `status`.
#[derive(Debug, Clone, Serialize)]
pub struct Order {
    pub order_id: OrderId,
    pub user_id: UserId,
    /// Sum of line extended prices, rounded to 2 decimal places.
    pub total_amount: Decimal,
    pub shipping_address_id: AddressId,
    /// Opaque payment method string; no gateway integration.
    pub payment_method: String,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

/// An order joined with its shipping address fields.
///
/// Address fields are optional because the join is a LEFT JOIN; a deleted
/// address does not hide the order.
#[derive(Debug, Clone, Serialize)]
pub struct OrderWithAddress {
    #[serde(flatten)]
    pub order: Order,
    pub address_line1: Option<String>,
    pub address_line2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
}

/// An order line: quantity purchased at a captured unit price.
///
/// `price` is historical fact; later product price changes never touch it.
#[derive(Debug, Clone, Serialize)]
pub struct OrderItemDetail {
    pub order_item_id: OrderItemId,
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub quantity: i32,
    pub price: Decimal,
    pub product_name: String,
    pub image_url: Option<String>,
}

/// Full order detail: header, address, and line items.
#[derive(Debug, Clone, Serialize)]
pub struct OrderDetail {
    #[serde(flatten)]
    pub order: OrderWithAddress,
    pub items: Vec<OrderItemDetail>,
}

/// An order joined with purchaser identity (admin listing).
#[derive(Debug, Clone, Serialize)]
pub struct OrderWithCustomer {
    #[serde(flatten)]
    pub order: Order,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

/// Input for checkout.
#[derive(Debug, Clone)]
pub struct CheckoutInput {
    pub shipping_address_id: AddressId,
    pub payment_method: String,
}

/// What a successful checkout hands back to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutSummary {
    pub order_id: OrderId,
    pub total_amount: Decimal,
}
