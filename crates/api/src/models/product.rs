//! Product and review domain types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use clementine_core::{CategoryId, ProductId, ReviewId, UserId};

/// A catalog product.
#[derive(Debug, Clone, Serialize)]
pub struct Product {
    pub product_id: ProductId,
    pub product_name: String,
    pub description: Option<String>,
    /// Unit price, 2 decimal places.
    pub price: Decimal,
    /// Live stock on hand. Decremented by checkout, never below zero.
    pub stock_quantity: i32,
    pub category_id: Option<CategoryId>,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A product joined with its category name for listings.
#[derive(Debug, Clone, Serialize)]
pub struct ProductWithCategory {
    #[serde(flatten)]
    pub product: Product,
    pub category_name: Option<String>,
}

/// Input for creating or updating a product.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub product_name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub stock_quantity: i32,
    pub category_id: Option<CategoryId>,
    pub image_url: Option<String>,
}

/// Optional filters for the product listing.
#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    pub category_id: Option<CategoryId>,
    /// Case-insensitive substring match on name or description.
    pub search: Option<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
}

/// A product review.
#[derive(Debug, Clone, Serialize)]
pub struct Review {
    pub review_id: ReviewId,
    pub product_id: ProductId,
    pub user_id: UserId,
    /// 1 through 5.
    pub rating: i32,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A review joined with the reviewer's name.
#[derive(Debug, Clone, Serialize)]
pub struct ReviewWithAuthor {
    #[serde(flatten)]
    pub review: Review,
    pub first_name: String,
    pub last_name: String,
}
