//! Product catalog routes: public reads, admin writes, reviews.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;

use clementine_core::{CategoryId, ProductId};

use crate::db::products::ProductRepository;
use crate::db::RepositoryError;
use crate::error::{AppError, Result};
use crate::middleware::{RequireAdmin, RequireAuth};
use crate::models::product::{NewProduct, ProductFilter};
use crate::state::AppState;

/// Build the products router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", get(self::get_one).put(update).delete(delete))
        .route("/{id}/reviews", post(add_review))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    category: Option<i32>,
    search: Option<String>,
    min_price: Option<Decimal>,
    max_price: Option<Decimal>,
}

/// `GET /api/products`
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse> {
    let filter = ProductFilter {
        category_id: query.category.map(CategoryId::new),
        search: query.search,
        min_price: query.min_price,
        max_price: query.max_price,
    };

    let products = ProductRepository::new(state.pool()).list(&filter).await?;

    Ok(Json(json!({
        "success": true,
        "count": products.len(),
        "products": products,
    })))
}

/// `GET /api/products/{id}`
pub async fn get_one(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse> {
    let id = ProductId::new(id);
    let repo = ProductRepository::new(state.pool());

    let product = repo
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".to_string()))?;
    let reviews = repo.reviews_for(id).await?;

    Ok(Json(json!({
        "success": true,
        "product": product,
        "reviews": reviews,
    })))
}

#[derive(Debug, Deserialize)]
pub struct ProductRequest {
    name: Option<String>,
    description: Option<String>,
    price: Option<Decimal>,
    stock_quantity: Option<i32>,
    category_id: Option<i32>,
    image_url: Option<String>,
}

impl ProductRequest {
    /// Validate the request into repository input. Name and price are
    /// required; stock defaults to zero.
    fn into_input(self) -> Result<NewProduct> {
        let (Some(name), Some(price)) = (self.name, self.price) else {
            return Err(AppError::Validation(
                "Product name and price are required".to_string(),
            ));
        };
        if name.trim().is_empty() {
            return Err(AppError::Validation(
                "Product name and price are required".to_string(),
            ));
        }

        Ok(NewProduct {
            product_name: name,
            description: self.description,
            price,
            stock_quantity: self.stock_quantity.unwrap_or(0),
            category_id: self.category_id.map(CategoryId::new),
            image_url: self.image_url,
        })
    }
}

/// `POST /api/products` (admin)
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    Json(body): Json<ProductRequest>,
) -> Result<impl IntoResponse> {
    let input = body.into_input()?;
    let product_id = ProductRepository::new(state.pool()).create(&input).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Product created successfully",
            "productId": product_id,
        })),
    ))
}

/// `PUT /api/products/{id}` (admin)
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    Path(id): Path<i32>,
    Json(body): Json<ProductRequest>,
) -> Result<impl IntoResponse> {
    let input = body.into_input()?;

    ProductRepository::new(state.pool())
        .update(ProductId::new(id), &input)
        .await
        .map_err(not_found_as_product)?;

    Ok(Json(json!({
        "success": true,
        "message": "Product updated successfully",
    })))
}

/// `DELETE /api/products/{id}` (admin)
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse> {
    ProductRepository::new(state.pool())
        .delete(ProductId::new(id))
        .await
        .map_err(not_found_as_product)?;

    Ok(Json(json!({
        "success": true,
        "message": "Product deleted successfully",
    })))
}

#[derive(Debug, Deserialize)]
pub struct ReviewRequest {
    rating: Option<i32>,
    comment: Option<String>,
}

/// `POST /api/products/{id}/reviews`
pub async fn add_review(
    State(state): State<AppState>,
    RequireAuth(ctx): RequireAuth,
    Path(id): Path<i32>,
    Json(body): Json<ReviewRequest>,
) -> Result<impl IntoResponse> {
    let rating = body
        .rating
        .filter(|r| (1..=5).contains(r))
        .ok_or_else(|| AppError::Validation("Rating must be between 1 and 5".to_string()))?;

    let review_id = ProductRepository::new(state.pool())
        .add_review(ProductId::new(id), ctx.user_id, rating, body.comment)
        .await
        .map_err(not_found_as_product)?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Review added successfully",
            "reviewId": review_id,
        })),
    ))
}

fn not_found_as_product(err: RepositoryError) -> AppError {
    match err {
        RepositoryError::NotFound => AppError::NotFound("Product not found".to_string()),
        other => AppError::Database(other),
    }
}
