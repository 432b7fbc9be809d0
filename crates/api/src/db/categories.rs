//! Category repository for database operations.

use sqlx::PgPool;

use clementine_core::CategoryId;

use super::RepositoryError;
use super::products::ProductRow;
use crate::models::category::{Category, NewCategory};
use crate::models::product::Product;

/// Internal row type for category queries.
#[derive(Debug, sqlx::FromRow)]
struct CategoryRow {
    id: i32,
    name: String,
    description: Option<String>,
    parent_id: Option<i32>,
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Self {
            category_id: CategoryId::new(row.id),
            category_name: row.name,
            description: row.description,
            parent_id: row.parent_id.map(CategoryId::new),
        }
    }
}

/// Repository for category database operations.
pub struct CategoryRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CategoryRepository<'a> {
    /// Create a new category repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all categories ordered by name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Category>, RepositoryError> {
        let rows: Vec<CategoryRow> = sqlx::query_as(
            r"
            SELECT id, name, description, parent_id
            FROM categories
            ORDER BY name
            ",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Category::from).collect())
    }

    /// Get a category by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: CategoryId) -> Result<Option<Category>, RepositoryError> {
        let row: Option<CategoryRow> = sqlx::query_as(
            r"
            SELECT id, name, description, parent_id
            FROM categories
            WHERE id = $1
            ",
        )
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Category::from))
    }

    /// List the products in a category.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn products_in(&self, id: CategoryId) -> Result<Vec<Product>, RepositoryError> {
        let rows: Vec<ProductRow> = sqlx::query_as(
            r"
            SELECT id, name, description, price, stock_quantity, category_id,
                   image_url, created_at
            FROM products
            WHERE category_id = $1
            ",
        )
        .bind(id.as_i32())
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Product::from).collect())
    }

    /// Create a new category.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn create(&self, input: &NewCategory) -> Result<CategoryId, RepositoryError> {
        let id: i32 = sqlx::query_scalar(
            r"
            INSERT INTO categories (name, description, parent_id)
            VALUES ($1, $2, $3)
            RETURNING id
            ",
        )
        .bind(&input.category_name)
        .bind(&input.description)
        .bind(input.parent_id.map(|id| id.as_i32()))
        .fetch_one(self.pool)
        .await?;

        Ok(CategoryId::new(id))
    }

    /// Update a category.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the category doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update(
        &self,
        id: CategoryId,
        input: &NewCategory,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE categories
            SET name = $1, description = $2, parent_id = $3
            WHERE id = $4
            ",
        )
        .bind(&input.category_name)
        .bind(&input.description)
        .bind(input.parent_id.map(|id| id.as_i32()))
        .bind(id.as_i32())
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Delete a category.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the category doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn delete(&self, id: CategoryId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id.as_i32())
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}
