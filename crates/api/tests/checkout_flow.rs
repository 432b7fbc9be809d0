//! Database-backed tests for the checkout transaction.
//!
//! These tests require a running `PostgreSQL` database:
//!
//! ```bash
//! export DATABASE_URL=postgres://localhost/clementine_test
//! cargo test -p clementine-api -- --ignored
//! ```
//!
//! Migrations are applied on first connect. Each test seeds its own rows
//! with unique emails and asserts the database post-state directly, so the
//! suite can run repeatedly against the same database.

#![allow(clippy::unwrap_used)]

use std::time::{SystemTime, UNIX_EPOCH};

use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use rust_decimal::Decimal;
use secrecy::SecretString;
use serde_json::Value;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tower::ServiceExt;

use clementine_api::config::ApiConfig;
use clementine_api::db::orders::OrderRepository;
use clementine_api::models::order::CheckoutInput;
use clementine_api::routes;
use clementine_api::services::checkout::CheckoutError;
use clementine_api::state::AppState;
use clementine_core::{AddressId, ProductId, Role, UserId};

const TEST_SECRET: &str = "k9#mQ2$vL7@xR4!pW8&nB3*jF6^hT1%z";

async fn pool() -> PgPool {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for these tests");
    let pool = PgPoolOptions::new()
        .max_connections(4)
        .connect(&url)
        .await
        .expect("Failed to connect to test database");

    sqlx::migrate!()
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    pool
}

fn unique() -> u128 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_nanos()
}

fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

async fn seed_user(pool: &PgPool, role: Role) -> UserId {
    let id: i32 = sqlx::query_scalar(
        r"
        INSERT INTO users (email, password_hash, first_name, last_name, role)
        VALUES ($1, 'not-a-real-hash', 'Test', 'Shopper', $2)
        RETURNING id
        ",
    )
    .bind(format!("shopper+{}@example.com", unique()))
    .bind(role.to_string())
    .fetch_one(pool)
    .await
    .unwrap();
    UserId::new(id)
}

async fn seed_address(pool: &PgPool, user_id: UserId) -> AddressId {
    let id: i32 = sqlx::query_scalar(
        r"
        INSERT INTO addresses (user_id, address_line1, city, postal_code, country)
        VALUES ($1, '1 Test Lane', 'Testville', '00000', 'US')
        RETURNING id
        ",
    )
    .bind(user_id.as_i32())
    .fetch_one(pool)
    .await
    .unwrap();
    AddressId::new(id)
}

async fn seed_product(pool: &PgPool, price: &str, stock: i32) -> ProductId {
    let id: i32 = sqlx::query_scalar(
        r"
        INSERT INTO products (name, price, stock_quantity)
        VALUES ($1, $2, $3)
        RETURNING id
        ",
    )
    .bind(format!("Widget {}", unique()))
    .bind(dec(price))
    .bind(stock)
    .fetch_one(pool)
    .await
    .unwrap();
    ProductId::new(id)
}

async fn seed_cart_item(pool: &PgPool, user_id: UserId, product_id: ProductId, quantity: i32) {
    sqlx::query("INSERT INTO cart_items (user_id, product_id, quantity) VALUES ($1, $2, $3)")
        .bind(user_id.as_i32())
        .bind(product_id.as_i32())
        .bind(quantity)
        .execute(pool)
        .await
        .unwrap();
}

async fn stock_of(pool: &PgPool, product_id: ProductId) -> i32 {
    sqlx::query_scalar("SELECT stock_quantity FROM products WHERE id = $1")
        .bind(product_id.as_i32())
        .fetch_one(pool)
        .await
        .unwrap()
}

async fn cart_count(pool: &PgPool, user_id: UserId) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM cart_items WHERE user_id = $1")
        .bind(user_id.as_i32())
        .fetch_one(pool)
        .await
        .unwrap()
}

async fn order_count(pool: &PgPool, user_id: UserId) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM orders WHERE user_id = $1")
        .bind(user_id.as_i32())
        .fetch_one(pool)
        .await
        .unwrap()
}

fn checkout_input(address_id: AddressId) -> CheckoutInput {
    CheckoutInput {
        shipping_address_id: address_id,
        payment_method: "card".to_string(),
    }
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (set DATABASE_URL)"]
async fn test_checkout_creates_order_decrements_stock_and_clears_cart() {
    let pool = pool().await;
    let user_id = seed_user(&pool, Role::Customer).await;
    let address_id = seed_address(&pool, user_id).await;
    let first = seed_product(&pool, "10.00", 5).await;
    let second = seed_product(&pool, "5.00", 5).await;
    seed_cart_item(&pool, user_id, first, 2).await;
    seed_cart_item(&pool, user_id, second, 1).await;

    let summary = OrderRepository::new(&pool)
        .create_from_cart(user_id, &checkout_input(address_id))
        .await
        .unwrap();

    assert_eq!(summary.total_amount, dec("25.00"));

    let (total, status): (Decimal, String) =
        sqlx::query_as("SELECT total_amount, status FROM orders WHERE id = $1")
            .bind(summary.order_id.as_i32())
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(total, dec("25.00"));
    assert_eq!(status, "pending");

    // One line per cart item, with the unit price captured at checkout.
    let lines: Vec<(i32, i32, Decimal)> = sqlx::query_as(
        "SELECT product_id, quantity, price FROM order_items WHERE order_id = $1 ORDER BY id",
    )
    .bind(summary.order_id.as_i32())
    .fetch_all(&pool)
    .await
    .unwrap();
    assert_eq!(
        lines,
        vec![
            (first.as_i32(), 2, dec("10.00")),
            (second.as_i32(), 1, dec("5.00")),
        ]
    );

    assert_eq!(stock_of(&pool, first).await, 3);
    assert_eq!(stock_of(&pool, second).await, 4);
    assert_eq!(cart_count(&pool, user_id).await, 0);
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (set DATABASE_URL)"]
async fn test_checkout_insufficient_stock_rolls_back_everything() {
    let pool = pool().await;
    let user_id = seed_user(&pool, Role::Customer).await;
    let address_id = seed_address(&pool, user_id).await;
    let scarce = seed_product(&pool, "10.00", 1).await;
    seed_cart_item(&pool, user_id, scarce, 3).await;

    let result = OrderRepository::new(&pool)
        .create_from_cart(user_id, &checkout_input(address_id))
        .await;

    assert!(matches!(
        result,
        Err(CheckoutError::InsufficientStock(id)) if id == scarce
    ));

    // Nothing written, nothing touched.
    assert_eq!(order_count(&pool, user_id).await, 0);
    assert_eq!(stock_of(&pool, scarce).await, 1);
    assert_eq!(cart_count(&pool, user_id).await, 1);
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (set DATABASE_URL)"]
async fn test_checkout_empty_cart_is_rejected() {
    let pool = pool().await;
    let user_id = seed_user(&pool, Role::Customer).await;
    let address_id = seed_address(&pool, user_id).await;

    let result = OrderRepository::new(&pool)
        .create_from_cart(user_id, &checkout_input(address_id))
        .await;

    assert!(matches!(result, Err(CheckoutError::EmptyCart)));
    assert_eq!(order_count(&pool, user_id).await, 0);
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (set DATABASE_URL)"]
async fn test_concurrent_checkouts_never_oversell() {
    let pool = pool().await;
    let product = seed_product(&pool, "10.00", 5).await;

    let alice = seed_user(&pool, Role::Customer).await;
    let alice_address = seed_address(&pool, alice).await;
    seed_cart_item(&pool, alice, product, 3).await;

    let bob = seed_user(&pool, Role::Customer).await;
    let bob_address = seed_address(&pool, bob).await;
    seed_cart_item(&pool, bob, product, 3).await;

    // Both carts pass the read-time validation against stock 5; only one
    // checkout can win the conditional decrement.
    let alice_repo = OrderRepository::new(&pool);
    let bob_repo = OrderRepository::new(&pool);
    let alice_input = checkout_input(alice_address);
    let bob_input = checkout_input(bob_address);
    let (first, second) = tokio::join!(
        alice_repo.create_from_cart(alice, &alice_input),
        bob_repo.create_from_cart(bob, &bob_input),
    );

    let successes = usize::from(first.is_ok()) + usize::from(second.is_ok());
    assert_eq!(successes, 1);
    assert_eq!(stock_of(&pool, product).await, 2);
    assert_eq!(
        order_count(&pool, alice).await + order_count(&pool, bob).await,
        1
    );
}

// ============================================================================
// Route-level flow (response messages and envelopes)
// ============================================================================

fn state_for(pool: PgPool, url: &str) -> AppState {
    let config = ApiConfig {
        database_url: SecretString::from(url),
        host: "127.0.0.1".parse().unwrap(),
        port: 0,
        token_secret: SecretString::from(TEST_SECRET),
        token_ttl_hours: 24,
        sentry_dsn: None,
        sentry_environment: None,
    };
    AppState::new(config, pool)
}

async fn body_json(response: axum::http::Response<Body>) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (set DATABASE_URL)"]
async fn test_cart_to_order_flow_messages() {
    let pool = pool().await;
    let url = std::env::var("DATABASE_URL").unwrap();
    let state = state_for(pool.clone(), &url);
    let app = routes::router().with_state(state.clone());

    let user_id = seed_user(&pool, Role::Customer).await;
    let admin_id = seed_user(&pool, Role::Admin).await;
    let address_id = seed_address(&pool, user_id).await;
    let product = seed_product(&pool, "10.00", 5).await;

    let user_auth = format!(
        "Bearer {}",
        state.tokens().issue(user_id, Role::Customer).unwrap()
    );
    let admin_auth = format!(
        "Bearer {}",
        state.tokens().issue(admin_id, Role::Admin).unwrap()
    );

    // Add to cart
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/cart")
                .header(header::AUTHORIZATION, &user_auth)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(format!(
                    r#"{{"product_id":{},"quantity":2}}"#,
                    product.as_i32()
                )))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["message"], "Product added to cart");

    // Read the cart line id back
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/cart")
                .header(header::AUTHORIZATION, &user_auth)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let cart = body_json(response).await;
    assert_eq!(cart["total"], "20.00");
    let cart_id = cart["cartItems"][0]["cart_id"].as_i64().unwrap();

    // Update the quantity
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri(format!("/api/cart/{cart_id}"))
                .header(header::AUTHORIZATION, &user_auth)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"quantity":3}"#))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(
        body_json(response).await["message"],
        "Cart updated successfully"
    );

    // Checkout
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/orders")
                .header(header::AUTHORIZATION, &user_auth)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(format!(
                    r#"{{"shipping_address_id":{},"payment_method":"card"}}"#,
                    address_id.as_i32()
                )))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let checkout = body_json(response).await;
    assert_eq!(checkout["message"], "Order created successfully");
    assert_eq!(checkout["totalAmount"], "30.00");
    let order_id = checkout["orderId"].as_i64().unwrap();

    // Admin updates the status
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri(format!("/api/orders/{order_id}/status"))
                .header(header::AUTHORIZATION, &admin_auth)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"status":"shipped"}"#))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(
        body_json(response).await["message"],
        "Order status updated successfully"
    );

    // Cart is already empty after checkout; clearing again still succeeds.
    let response = app
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/api/cart")
                .header(header::AUTHORIZATION, &user_auth)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(
        body_json(response).await["message"],
        "Cart cleared successfully"
    );
}
