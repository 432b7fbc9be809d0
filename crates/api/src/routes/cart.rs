//! Cart routes. Every route requires a bearer token; all operations are
//! scoped to the caller's own cart.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::{get, put};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;

use clementine_core::{CartItemId, ProductId, format_amount, order_total};

use crate::db::RepositoryError;
use crate::db::cart::CartRepository;
use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::state::AppState;

/// Build the cart router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(add).delete(clear))
        .route("/{id}", put(update).delete(remove))
}

/// `GET /api/cart`
pub async fn list(
    State(state): State<AppState>,
    RequireAuth(ctx): RequireAuth,
) -> Result<impl IntoResponse> {
    let items = CartRepository::new(state.pool())
        .items_for_user(ctx.user_id)
        .await?;

    let total = order_total(items.iter().map(|item| (item.price, item.quantity)));

    Ok(Json(json!({
        "success": true,
        "count": items.len(),
        "total": format_amount(total),
        "cartItems": items,
    })))
}

#[derive(Debug, Deserialize)]
pub struct AddRequest {
    product_id: Option<i32>,
    quantity: Option<i32>,
}

/// `POST /api/cart`
pub async fn add(
    State(state): State<AppState>,
    RequireAuth(ctx): RequireAuth,
    Json(body): Json<AddRequest>,
) -> Result<impl IntoResponse> {
    let (Some(product_id), Some(quantity)) = (body.product_id, body.quantity) else {
        return Err(AppError::Validation(
            "Valid product_id and quantity required".to_string(),
        ));
    };
    if quantity < 1 {
        return Err(AppError::Validation(
            "Valid product_id and quantity required".to_string(),
        ));
    }

    CartRepository::new(state.pool())
        .add(ctx.user_id, ProductId::new(product_id), quantity)
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => AppError::NotFound("Product not found".to_string()),
            RepositoryError::Conflict(_) => {
                AppError::Validation("Insufficient stock available".to_string())
            }
            other => AppError::Database(other),
        })?;

    Ok(Json(json!({
        "success": true,
        "message": "Product added to cart",
    })))
}

#[derive(Debug, Deserialize)]
pub struct UpdateRequest {
    quantity: Option<i32>,
}

/// `PUT /api/cart/{id}`
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(ctx): RequireAuth,
    Path(id): Path<i32>,
    Json(body): Json<UpdateRequest>,
) -> Result<impl IntoResponse> {
    let quantity = body
        .quantity
        .filter(|q| *q >= 1)
        .ok_or_else(|| AppError::Validation("Valid quantity required".to_string()))?;

    CartRepository::new(state.pool())
        .update_quantity(CartItemId::new(id), ctx.user_id, quantity)
        .await
        .map_err(not_found_as_cart_item)?;

    Ok(Json(json!({
        "success": true,
        "message": "Cart updated successfully",
    })))
}

/// `DELETE /api/cart/{id}`
pub async fn remove(
    State(state): State<AppState>,
    RequireAuth(ctx): RequireAuth,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse> {
    CartRepository::new(state.pool())
        .remove(CartItemId::new(id), ctx.user_id)
        .await
        .map_err(not_found_as_cart_item)?;

    Ok(Json(json!({
        "success": true,
        "message": "Item removed from cart",
    })))
}

/// `DELETE /api/cart`
pub async fn clear(
    State(state): State<AppState>,
    RequireAuth(ctx): RequireAuth,
) -> Result<impl IntoResponse> {
    CartRepository::new(state.pool()).clear(ctx.user_id).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Cart cleared successfully",
    })))
}

fn not_found_as_cart_item(err: RepositoryError) -> AppError {
    match err {
        RepositoryError::NotFound => AppError::NotFound("Cart item not found".to_string()),
        other => AppError::Database(other),
    }
}
