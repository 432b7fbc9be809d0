//! Category domain types.

use serde::Serialize;

use clementine_core::CategoryId;

use super::product::Product;

/// A product category.
#[derive(Debug, Clone, Serialize)]
pub struct Category {
    pub category_id: CategoryId,
    pub category_name: String,
    pub description: Option<String>,
    /// Optional parent for nested categories.
    pub parent_id: Option<CategoryId>,
}

/// A category together with its products.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryWithProducts {
    #[serde(flatten)]
    pub category: Category,
    pub products: Vec<Product>,
}

/// Input for creating or updating a category.
#[derive(Debug, Clone)]
pub struct NewCategory {
    pub category_name: String,
    pub description: Option<String>,
    pub parent_id: Option<CategoryId>,
}
