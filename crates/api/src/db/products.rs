//! Product and review repository for database operations.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, QueryBuilder};

use clementine_core::{CategoryId, ProductId, ReviewId, UserId};

use super::RepositoryError;
use crate::models::product::{
    NewProduct, Product, ProductFilter, ProductWithCategory, Review, ReviewWithAuthor,
};

/// Internal row type for product queries.
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct ProductRow {
    id: i32,
    name: String,
    description: Option<String>,
    price: Decimal,
    stock_quantity: i32,
    category_id: Option<i32>,
    image_url: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            product_id: ProductId::new(row.id),
            product_name: row.name,
            description: row.description,
            price: row.price,
            stock_quantity: row.stock_quantity,
            category_id: row.category_id.map(CategoryId::new),
            image_url: row.image_url,
            created_at: row.created_at,
        }
    }
}

/// Internal row type for product-with-category queries.
#[derive(Debug, sqlx::FromRow)]
struct ProductWithCategoryRow {
    #[sqlx(flatten)]
    product: ProductRow,
    category_name: Option<String>,
}

impl From<ProductWithCategoryRow> for ProductWithCategory {
    fn from(row: ProductWithCategoryRow) -> Self {
        Self {
            product: row.product.into(),
            category_name: row.category_name,
        }
    }
}

/// Internal row type for review queries.
#[derive(Debug, sqlx::FromRow)]
struct ReviewWithAuthorRow {
    id: i32,
    product_id: i32,
    user_id: i32,
    rating: i32,
    comment: Option<String>,
    created_at: DateTime<Utc>,
    first_name: String,
    last_name: String,
}

impl From<ReviewWithAuthorRow> for ReviewWithAuthor {
    fn from(row: ReviewWithAuthorRow) -> Self {
        Self {
            review: Review {
                review_id: ReviewId::new(row.id),
                product_id: ProductId::new(row.product_id),
                user_id: UserId::new(row.user_id),
                rating: row.rating,
                comment: row.comment,
                created_at: row.created_at,
            },
            first_name: row.first_name,
            last_name: row.last_name,
        }
    }
}

/// Repository for product database operations.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List products, newest first, with optional filters applied.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(
        &self,
        filter: &ProductFilter,
    ) -> Result<Vec<ProductWithCategory>, RepositoryError> {
        let mut query = QueryBuilder::new(
            r"
            SELECT p.id, p.name, p.description, p.price, p.stock_quantity,
                   p.category_id, p.image_url, p.created_at,
                   c.name AS category_name
            FROM products p
            LEFT JOIN categories c ON p.category_id = c.id
            WHERE 1=1
            ",
        );

        if let Some(category_id) = filter.category_id {
            query.push(" AND p.category_id = ");
            query.push_bind(category_id.as_i32());
        }

        if let Some(search) = &filter.search {
            let pattern = format!("%{search}%");
            query.push(" AND (p.name ILIKE ");
            query.push_bind(pattern.clone());
            query.push(" OR p.description ILIKE ");
            query.push_bind(pattern);
            query.push(")");
        }

        if let Some(min_price) = filter.min_price {
            query.push(" AND p.price >= ");
            query.push_bind(min_price);
        }

        if let Some(max_price) = filter.max_price {
            query.push(" AND p.price <= ");
            query.push_bind(max_price);
        }

        query.push(" ORDER BY p.created_at DESC");

        let rows: Vec<ProductWithCategoryRow> =
            query.build_query_as().fetch_all(self.pool).await?;

        Ok(rows.into_iter().map(ProductWithCategory::from).collect())
    }

    /// Get a product by ID, joined with its category name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: ProductId) -> Result<Option<ProductWithCategory>, RepositoryError> {
        let row: Option<ProductWithCategoryRow> = sqlx::query_as(
            r"
            SELECT p.id, p.name, p.description, p.price, p.stock_quantity,
                   p.category_id, p.image_url, p.created_at,
                   c.name AS category_name
            FROM products p
            LEFT JOIN categories c ON p.category_id = c.id
            WHERE p.id = $1
            ",
        )
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(ProductWithCategory::from))
    }

    /// List a product's reviews joined with reviewer names.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn reviews_for(
        &self,
        id: ProductId,
    ) -> Result<Vec<ReviewWithAuthor>, RepositoryError> {
        let rows: Vec<ReviewWithAuthorRow> = sqlx::query_as(
            r"
            SELECT r.id, r.product_id, r.user_id, r.rating, r.comment, r.created_at,
                   u.first_name, u.last_name
            FROM reviews r
            JOIN users u ON r.user_id = u.id
            WHERE r.product_id = $1
            ",
        )
        .bind(id.as_i32())
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(ReviewWithAuthor::from).collect())
    }

    /// Create a new product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn create(&self, input: &NewProduct) -> Result<ProductId, RepositoryError> {
        let id: i32 = sqlx::query_scalar(
            r"
            INSERT INTO products (name, description, price, stock_quantity, category_id, image_url)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            ",
        )
        .bind(&input.product_name)
        .bind(&input.description)
        .bind(input.price)
        .bind(input.stock_quantity)
        .bind(input.category_id.map(|id| id.as_i32()))
        .bind(&input.image_url)
        .fetch_one(self.pool)
        .await?;

        Ok(ProductId::new(id))
    }

    /// Update a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update(&self, id: ProductId, input: &NewProduct) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE products
            SET name = $1, description = $2, price = $3, stock_quantity = $4,
                category_id = $5, image_url = $6
            WHERE id = $7
            ",
        )
        .bind(&input.product_name)
        .bind(&input.description)
        .bind(input.price)
        .bind(input.stock_quantity)
        .bind(input.category_id.map(|id| id.as_i32()))
        .bind(&input.image_url)
        .bind(id.as_i32())
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Delete a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn delete(&self, id: ProductId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id.as_i32())
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Add a review to a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn add_review(
        &self,
        product_id: ProductId,
        user_id: UserId,
        rating: i32,
        comment: Option<String>,
    ) -> Result<ReviewId, RepositoryError> {
        let id: i32 = sqlx::query_scalar(
            r"
            INSERT INTO reviews (product_id, user_id, rating, comment)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            ",
        )
        .bind(product_id.as_i32())
        .bind(user_id.as_i32())
        .bind(rating)
        .bind(&comment)
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_foreign_key_violation()
            {
                return RepositoryError::NotFound;
            }
            RepositoryError::Database(e)
        })?;

        Ok(ReviewId::new(id))
    }
}
