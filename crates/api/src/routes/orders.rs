//! Order routes, including checkout.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;

use clementine_core::{AddressId, OrderId, OrderStatus, format_amount};

use crate::db::RepositoryError;
use crate::db::orders::OrderRepository;
use crate::error::{AppError, Result};
use crate::middleware::{RequireAdmin, RequireAuth};
use crate::models::order::CheckoutInput;
use crate::state::AppState;

/// Build the orders router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(checkout).get(list_mine))
        .route("/all", get(list_all))
        .route("/{id}", get(detail))
        .route("/{id}/status", put(update_status))
}

#[derive(Debug, Deserialize)]
pub struct CheckoutRequest {
    shipping_address_id: Option<i32>,
    payment_method: Option<String>,
}

/// `POST /api/orders`
///
/// Converts the caller's cart into an order in one transaction; see
/// [`OrderRepository::create_from_cart`].
pub async fn checkout(
    State(state): State<AppState>,
    RequireAuth(ctx): RequireAuth,
    Json(body): Json<CheckoutRequest>,
) -> Result<impl IntoResponse> {
    let (Some(shipping_address_id), Some(payment_method)) =
        (body.shipping_address_id, body.payment_method)
    else {
        return Err(AppError::Validation(
            "Shipping address and payment method required".to_string(),
        ));
    };

    let input = CheckoutInput {
        shipping_address_id: AddressId::new(shipping_address_id),
        payment_method,
    };

    let summary = OrderRepository::new(state.pool())
        .create_from_cart(ctx.user_id, &input)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Order created successfully",
            "orderId": summary.order_id,
            "totalAmount": format_amount(summary.total_amount),
        })),
    ))
}

/// `GET /api/orders`
pub async fn list_mine(
    State(state): State<AppState>,
    RequireAuth(ctx): RequireAuth,
) -> Result<impl IntoResponse> {
    let orders = OrderRepository::new(state.pool())
        .list_for_user(ctx.user_id)
        .await?;

    Ok(Json(json!({
        "success": true,
        "count": orders.len(),
        "orders": orders,
    })))
}

/// `GET /api/orders/all` (admin)
pub async fn list_all(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
) -> Result<impl IntoResponse> {
    let orders = OrderRepository::new(state.pool()).list_all().await?;

    Ok(Json(json!({
        "success": true,
        "count": orders.len(),
        "orders": orders,
    })))
}

/// `GET /api/orders/{id}`
///
/// Owner-scoped: an order belonging to another user is indistinguishable
/// from one that doesn't exist.
pub async fn detail(
    State(state): State<AppState>,
    RequireAuth(ctx): RequireAuth,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse> {
    let order = OrderRepository::new(state.pool())
        .get_detail_for_user(OrderId::new(id), ctx.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Order not found".to_string()))?;

    Ok(Json(json!({
        "success": true,
        "order": order,
    })))
}

#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    status: Option<String>,
}

/// `PUT /api/orders/{id}/status` (admin)
///
/// Any valid status may follow any other; there is no transition graph.
pub async fn update_status(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    Path(id): Path<i32>,
    Json(body): Json<StatusRequest>,
) -> Result<impl IntoResponse> {
    let status: OrderStatus = body
        .status
        .as_deref()
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| AppError::Validation("Invalid status".to_string()))?;

    OrderRepository::new(state.pool())
        .update_status(OrderId::new(id), status)
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => AppError::NotFound("Order not found".to_string()),
            other => AppError::Database(other),
        })?;

    Ok(Json(json!({
        "success": true,
        "message": "Order status updated successfully",
    })))
}
