//! Request-level tests for the authentication gate and input validation.
//!
//! These drive the full router in-process with `tower::ServiceExt::oneshot`.
//! The database pool is created lazily and never connected: every request
//! here must be rejected by the auth extractors or input validation before
//! any query runs.

#![allow(clippy::unwrap_used)]

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use secrecy::SecretString;
use serde_json::Value;
use sqlx::postgres::PgPoolOptions;
use tower::ServiceExt;

use clementine_api::config::ApiConfig;
use clementine_api::routes;
use clementine_api::state::AppState;
use clementine_core::{Role, UserId};

const TEST_SECRET: &str = "k9#mQ2$vL7@xR4!pW8&nB3*jF6^hT1%z";

fn test_state() -> AppState {
    let config = ApiConfig {
        database_url: SecretString::from("postgres://localhost/unreachable"),
        host: "127.0.0.1".parse().unwrap(),
        port: 0,
        token_secret: SecretString::from(TEST_SECRET),
        token_ttl_hours: 24,
        sentry_dsn: None,
        sentry_environment: None,
    };

    // Lazy pool: no connection is attempted until a query runs, and none of
    // these tests get that far.
    let pool = PgPoolOptions::new()
        .connect_lazy("postgres://localhost/unreachable")
        .unwrap();

    AppState::new(config, pool)
}

fn app() -> Router {
    routes::router().with_state(test_state())
}

fn bearer_for(state: &AppState, user_id: i32, role: Role) -> String {
    let token = state.tokens().issue(UserId::new(user_id), role).unwrap();
    format!("Bearer {token}")
}

async fn body_json(response: axum::http::Response<Body>) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_missing_token_is_unauthorized() {
    let response = app()
        .oneshot(
            Request::builder()
                .uri("/api/cart")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(response).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["message"], "Authentication required");
}

#[tokio::test]
async fn test_non_bearer_scheme_is_unauthorized() {
    let response = app()
        .oneshot(
            Request::builder()
                .uri("/api/orders")
                .header(header::AUTHORIZATION, "Basic dXNlcjpwYXNz")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_garbage_token_is_unauthorized() {
    let response = app()
        .oneshot(
            Request::builder()
                .uri("/api/auth/profile")
                .header(header::AUTHORIZATION, "Bearer not-a-token")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(response).await;
    assert_eq!(json["message"], "Invalid token");
}

#[tokio::test]
async fn test_token_from_other_secret_is_unauthorized() {
    let state = test_state();
    let other = clementine_api::services::tokens::TokenService::new(
        &SecretString::from("z1%T6h^F3j*B8n&W4p!R7x@L2v$Q9m#k"),
        24,
    );
    let token = other.issue(UserId::new(1), Role::Customer).unwrap();

    let response = routes::router()
        .with_state(state)
        .oneshot(
            Request::builder()
                .uri("/api/cart")
                .header(header::AUTHORIZATION, format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_customer_on_admin_route_is_forbidden() {
    let state = test_state();
    let auth = bearer_for(&state, 7, Role::Customer);

    let response = routes::router()
        .with_state(state)
        .oneshot(
            Request::builder()
                .uri("/api/orders/all")
                .header(header::AUTHORIZATION, auth)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let json = body_json(response).await;
    assert_eq!(json["message"], "Admin access required");
}

#[tokio::test]
async fn test_customer_cannot_update_order_status() {
    let state = test_state();
    let auth = bearer_for(&state, 7, Role::Customer);

    let response = routes::router()
        .with_state(state)
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri("/api/orders/1/status")
                .header(header::AUTHORIZATION, auth)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"status":"shipped"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_invalid_status_is_rejected_before_database() {
    let state = test_state();
    let auth = bearer_for(&state, 1, Role::Admin);

    let response = routes::router()
        .with_state(state)
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri("/api/orders/1/status")
                .header(header::AUTHORIZATION, auth)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"status":"teleported"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["message"], "Invalid status");
}

#[tokio::test]
async fn test_checkout_requires_address_and_payment_method() {
    let state = test_state();
    let auth = bearer_for(&state, 3, Role::Customer);

    let response = routes::router()
        .with_state(state)
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/orders")
                .header(header::AUTHORIZATION, auth)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"payment_method":"card"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["message"], "Shipping address and payment method required");
}

#[tokio::test]
async fn test_cart_add_requires_product_and_quantity() {
    let state = test_state();
    let auth = bearer_for(&state, 3, Role::Customer);

    let response = routes::router()
        .with_state(state)
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/cart")
                .header(header::AUTHORIZATION, auth)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"product_id":1,"quantity":0}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["message"], "Valid product_id and quantity required");
}

#[tokio::test]
async fn test_review_rating_must_be_in_range() {
    let state = test_state();
    let auth = bearer_for(&state, 3, Role::Customer);

    let response = routes::router()
        .with_state(state)
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/products/1/reviews")
                .header(header::AUTHORIZATION, auth)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"rating":6}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["message"], "Rating must be between 1 and 5");
}

#[tokio::test]
async fn test_register_treats_blank_fields_as_missing() {
    let response = app()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/auth/register")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    r#"{"email":"a@example.com","password":"hunter2","first_name":"   ","last_name":"Smith"}"#,
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["message"], "Missing required fields: first_name");
}

#[tokio::test]
async fn test_register_rejects_email_without_domain_dot() {
    let response = app()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/auth/register")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    r#"{"email":"user@domain","password":"hunter2","first_name":"Jo","last_name":"Smith"}"#,
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["message"], "Invalid email format");
}

#[tokio::test]
async fn test_register_reports_missing_fields() {
    let response = app()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/auth/register")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"email":"a@example.com"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(
        json["message"],
        "Missing required fields: password, first_name, last_name"
    );
}
