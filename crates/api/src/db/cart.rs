//! Cart repository for database operations.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use clementine_core::{CartItemId, ProductId, UserId};

use super::RepositoryError;
use crate::models::cart::CartItemDetail;

/// Internal row type for cart item queries.
#[derive(Debug, sqlx::FromRow)]
struct CartItemRow {
    cart_id: i32,
    quantity: i32,
    added_at: DateTime<Utc>,
    product_id: i32,
    product_name: String,
    price: Decimal,
    image_url: Option<String>,
    stock_quantity: i32,
}

impl From<CartItemRow> for CartItemDetail {
    fn from(row: CartItemRow) -> Self {
        Self {
            cart_id: CartItemId::new(row.cart_id),
            quantity: row.quantity,
            added_at: row.added_at,
            product_id: ProductId::new(row.product_id),
            product_name: row.product_name,
            price: row.price,
            image_url: row.image_url,
            stock_quantity: row.stock_quantity,
        }
    }
}

/// Repository for cart database operations.
pub struct CartRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CartRepository<'a> {
    /// Create a new cart repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List a user's cart items joined with product display data,
    /// in insertion order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn items_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<CartItemDetail>, RepositoryError> {
        let rows: Vec<CartItemRow> = sqlx::query_as(
            r"
            SELECT c.id AS cart_id, c.quantity, c.added_at,
                   p.id AS product_id, p.name AS product_name, p.price,
                   p.image_url, p.stock_quantity
            FROM cart_items c
            JOIN products p ON c.product_id = p.id
            WHERE c.user_id = $1
            ORDER BY c.added_at, c.id
            ",
        )
        .bind(user_id.as_i32())
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(CartItemDetail::from).collect())
    }

    /// Add a product to a user's cart.
    ///
    /// If the product is already in the cart the quantities are merged into
    /// the existing line rather than creating a duplicate.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist.
    /// Returns `RepositoryError::Conflict` if stock is insufficient for the
    /// requested quantity.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn add(
        &self,
        user_id: UserId,
        product_id: ProductId,
        quantity: i32,
    ) -> Result<(), RepositoryError> {
        let stock: Option<i32> =
            sqlx::query_scalar("SELECT stock_quantity FROM products WHERE id = $1")
                .bind(product_id.as_i32())
                .fetch_optional(self.pool)
                .await?;

        let Some(stock) = stock else {
            return Err(RepositoryError::NotFound);
        };

        if stock < quantity {
            return Err(RepositoryError::Conflict(
                "insufficient stock available".to_owned(),
            ));
        }

        sqlx::query(
            r"
            INSERT INTO cart_items (user_id, product_id, quantity)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id, product_id)
            DO UPDATE SET quantity = cart_items.quantity + EXCLUDED.quantity
            ",
        )
        .bind(user_id.as_i32())
        .bind(product_id.as_i32())
        .bind(quantity)
        .execute(self.pool)
        .await?;

        Ok(())
    }

    /// Set the quantity of a cart item. Scoped to the owning user so one
    /// user cannot touch another's cart lines.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the cart item doesn't exist or
    /// belongs to another user.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update_quantity(
        &self,
        cart_id: CartItemId,
        user_id: UserId,
        quantity: i32,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE cart_items
            SET quantity = $1
            WHERE id = $2 AND user_id = $3
            ",
        )
        .bind(quantity)
        .bind(cart_id.as_i32())
        .bind(user_id.as_i32())
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Remove a single cart item, scoped to the owning user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the cart item doesn't exist or
    /// belongs to another user.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn remove(
        &self,
        cart_id: CartItemId,
        user_id: UserId,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM cart_items WHERE id = $1 AND user_id = $2")
            .bind(cart_id.as_i32())
            .bind(user_id.as_i32())
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Remove every item in a user's cart. Clearing an already-empty cart
    /// is not an error.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn clear(&self, user_id: UserId) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM cart_items WHERE user_id = $1")
            .bind(user_id.as_i32())
            .execute(self.pool)
            .await?;

        Ok(())
    }
}
