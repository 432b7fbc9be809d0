//! Order repository, including the checkout transaction.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use clementine_core::{
    AddressId, OrderId, OrderItemId, OrderStatus, ProductId, UserId,
};

use super::RepositoryError;
use crate::models::cart::CartLine;
use crate::models::order::{
    CheckoutInput, CheckoutSummary, Order, OrderDetail, OrderItemDetail, OrderWithAddress,
    OrderWithCustomer,
};
use crate::services::checkout::{CheckoutError, checkout_total, validate_cart};

/// Internal row type for order header queries.
#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: i32,
    user_id: i32,
    total_amount: Decimal,
    shipping_address_id: i32,
    payment_method: String,
    status: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<OrderRow> for Order {
    type Error = RepositoryError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        let status: OrderStatus = row.status.parse().map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid order status in database: {e}"))
        })?;

        Ok(Self {
            order_id: OrderId::new(row.id),
            user_id: UserId::new(row.user_id),
            total_amount: row.total_amount,
            shipping_address_id: AddressId::new(row.shipping_address_id),
            payment_method: row.payment_method,
            status,
            created_at: row.created_at,
        })
    }
}

/// Internal row type for order-with-address queries.
#[derive(Debug, sqlx::FromRow)]
struct OrderWithAddressRow {
    #[sqlx(flatten)]
    order: OrderRow,
    address_line1: Option<String>,
    address_line2: Option<String>,
    city: Option<String>,
    state: Option<String>,
    postal_code: Option<String>,
    country: Option<String>,
}

impl TryFrom<OrderWithAddressRow> for OrderWithAddress {
    type Error = RepositoryError;

    fn try_from(row: OrderWithAddressRow) -> Result<Self, Self::Error> {
        Ok(Self {
            order: row.order.try_into()?,
            address_line1: row.address_line1,
            address_line2: row.address_line2,
            city: row.city,
            state: row.state,
            postal_code: row.postal_code,
            country: row.country,
        })
    }
}

/// Internal row type for order line queries.
#[derive(Debug, sqlx::FromRow)]
struct OrderItemRow {
    id: i32,
    order_id: i32,
    product_id: i32,
    quantity: i32,
    price: Decimal,
    product_name: String,
    image_url: Option<String>,
}

impl From<OrderItemRow> for OrderItemDetail {
    fn from(row: OrderItemRow) -> Self {
        Self {
            order_item_id: OrderItemId::new(row.id),
            order_id: OrderId::new(row.order_id),
            product_id: ProductId::new(row.product_id),
            quantity: row.quantity,
            price: row.price,
            product_name: row.product_name,
            image_url: row.image_url,
        }
    }
}

/// Internal row type for order-with-customer queries.
#[derive(Debug, sqlx::FromRow)]
struct OrderWithCustomerRow {
    #[sqlx(flatten)]
    order: OrderRow,
    email: String,
    first_name: String,
    last_name: String,
}

impl TryFrom<OrderWithCustomerRow> for OrderWithCustomer {
    type Error = RepositoryError;

    fn try_from(row: OrderWithCustomerRow) -> Result<Self, Self::Error> {
        Ok(Self {
            order: row.order.try_into()?,
            email: row.email,
            first_name: row.first_name,
            last_name: row.last_name,
        })
    }
}

/// Internal row type for the cart read at the start of checkout.
#[derive(Debug, sqlx::FromRow)]
struct CartLineRow {
    product_id: i32,
    quantity: i32,
    price: Decimal,
    stock_quantity: i32,
}

impl From<CartLineRow> for CartLine {
    fn from(row: CartLineRow) -> Self {
        Self {
            product_id: ProductId::new(row.product_id),
            quantity: row.quantity,
            unit_price: row.price,
            stock_quantity: row.stock_quantity,
        }
    }
}

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Convert a user's cart into an order, atomically.
    ///
    /// Runs as a single transaction: read the cart joined with live product
    /// prices and stock, validate it, write the order header and one line per
    /// cart item, decrement stock, and clear the cart. The decrement is
    /// conditional (`stock_quantity >= quantity`), so a concurrent checkout
    /// that drains stock between the read and the write aborts this one
    /// instead of driving stock negative. Any error rolls the whole
    /// transaction back; stock and cart are untouched.
    ///
    /// Line `price` captures the product price at checkout time.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::EmptyCart` if the cart has no lines,
    /// `CheckoutError::InsufficientStock` naming the first product that
    /// cannot be satisfied, or `CheckoutError::Repository` for database
    /// errors.
    pub async fn create_from_cart(
        &self,
        user_id: UserId,
        input: &CheckoutInput,
    ) -> Result<CheckoutSummary, CheckoutError> {
        let mut tx = self.pool.begin().await.map_err(RepositoryError::from)?;

        let rows: Vec<CartLineRow> = sqlx::query_as(
            r"
            SELECT c.product_id, c.quantity, p.price, p.stock_quantity
            FROM cart_items c
            JOIN products p ON c.product_id = p.id
            WHERE c.user_id = $1
            ORDER BY c.added_at, c.id
            ",
        )
        .bind(user_id.as_i32())
        .fetch_all(&mut *tx)
        .await
        .map_err(RepositoryError::from)?;

        let lines: Vec<CartLine> = rows.into_iter().map(CartLine::from).collect();

        validate_cart(&lines)?;
        let total_amount = checkout_total(&lines);

        let order_id: i32 = sqlx::query_scalar(
            r"
            INSERT INTO orders (user_id, total_amount, shipping_address_id, payment_method, status)
            VALUES ($1, $2, $3, $4, 'pending')
            RETURNING id
            ",
        )
        .bind(user_id.as_i32())
        .bind(total_amount)
        .bind(input.shipping_address_id.as_i32())
        .bind(&input.payment_method)
        .fetch_one(&mut *tx)
        .await
        .map_err(RepositoryError::from)?;

        for line in &lines {
            sqlx::query(
                r"
                INSERT INTO order_items (order_id, product_id, quantity, price)
                VALUES ($1, $2, $3, $4)
                ",
            )
            .bind(order_id)
            .bind(line.product_id.as_i32())
            .bind(line.quantity)
            .bind(line.unit_price)
            .execute(&mut *tx)
            .await
            .map_err(RepositoryError::from)?;

            let decremented = sqlx::query(
                r"
                UPDATE products
                SET stock_quantity = stock_quantity - $2
                WHERE id = $1 AND stock_quantity >= $2
                ",
            )
            .bind(line.product_id.as_i32())
            .bind(line.quantity)
            .execute(&mut *tx)
            .await
            .map_err(RepositoryError::from)?;

            if decremented.rows_affected() == 0 {
                return Err(CheckoutError::InsufficientStock(line.product_id));
            }
        }

        sqlx::query("DELETE FROM cart_items WHERE user_id = $1")
            .bind(user_id.as_i32())
            .execute(&mut *tx)
            .await
            .map_err(RepositoryError::from)?;

        tx.commit().await.map_err(RepositoryError::from)?;

        Ok(CheckoutSummary {
            order_id: OrderId::new(order_id),
            total_amount,
        })
    }

    /// List a user's orders joined with shipping addresses, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if stored data is invalid.
    pub async fn list_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<OrderWithAddress>, RepositoryError> {
        let rows: Vec<OrderWithAddressRow> = sqlx::query_as(
            r"
            SELECT o.id, o.user_id, o.total_amount, o.shipping_address_id,
                   o.payment_method, o.status, o.created_at,
                   a.address_line1, a.address_line2, a.city, a.state,
                   a.postal_code, a.country
            FROM orders o
            LEFT JOIN addresses a ON o.shipping_address_id = a.id
            WHERE o.user_id = $1
            ORDER BY o.created_at DESC
            ",
        )
        .bind(user_id.as_i32())
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(OrderWithAddress::try_from).collect()
    }

    /// Get an order's full detail, scoped to the owning user.
    ///
    /// Returns `None` if the order doesn't exist or belongs to another user;
    /// the two cases are indistinguishable to the caller.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if stored data is invalid.
    pub async fn get_detail_for_user(
        &self,
        order_id: OrderId,
        user_id: UserId,
    ) -> Result<Option<OrderDetail>, RepositoryError> {
        let row: Option<OrderWithAddressRow> = sqlx::query_as(
            r"
            SELECT o.id, o.user_id, o.total_amount, o.shipping_address_id,
                   o.payment_method, o.status, o.created_at,
                   a.address_line1, a.address_line2, a.city, a.state,
                   a.postal_code, a.country
            FROM orders o
            LEFT JOIN addresses a ON o.shipping_address_id = a.id
            WHERE o.id = $1 AND o.user_id = $2
            ",
        )
        .bind(order_id.as_i32())
        .bind(user_id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        let order = OrderWithAddress::try_from(row)?;

        let item_rows: Vec<OrderItemRow> = sqlx::query_as(
            r"
            SELECT i.id, i.order_id, i.product_id, i.quantity, i.price,
                   p.name AS product_name, p.image_url
            FROM order_items i
            JOIN products p ON i.product_id = p.id
            WHERE i.order_id = $1
            ORDER BY i.id
            ",
        )
        .bind(order_id.as_i32())
        .fetch_all(self.pool)
        .await?;

        Ok(Some(OrderDetail {
            order,
            items: item_rows.into_iter().map(OrderItemDetail::from).collect(),
        }))
    }

    /// Set an order's status.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update_status(
        &self,
        order_id: OrderId,
        status: OrderStatus,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE orders SET status = $1 WHERE id = $2")
            .bind(status.as_str())
            .bind(order_id.as_i32())
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// List every order joined with purchaser identity, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if stored data is invalid.
    pub async fn list_all(&self) -> Result<Vec<OrderWithCustomer>, RepositoryError> {
        let rows: Vec<OrderWithCustomerRow> = sqlx::query_as(
            r"
            SELECT o.id, o.user_id, o.total_amount, o.shipping_address_id,
                   o.payment_method, o.status, o.created_at,
                   u.email, u.first_name, u.last_name
            FROM orders o
            JOIN users u ON o.user_id = u.id
            ORDER BY o.created_at DESC
            ",
        )
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(OrderWithCustomer::try_from).collect()
    }
}
