//! Category routes: public reads, admin writes.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;

use clementine_core::CategoryId;

use crate::db::RepositoryError;
use crate::db::categories::CategoryRepository;
use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::models::category::{CategoryWithProducts, NewCategory};
use crate::state::AppState;

/// Build the categories router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", get(get_one).put(update).delete(delete))
}

/// `GET /api/categories`
pub async fn list(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let categories = CategoryRepository::new(state.pool()).list().await?;

    Ok(Json(json!({
        "success": true,
        "count": categories.len(),
        "categories": categories,
    })))
}

/// `GET /api/categories/{id}`
pub async fn get_one(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse> {
    let id = CategoryId::new(id);
    let repo = CategoryRepository::new(state.pool());

    let category = repo
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Category not found".to_string()))?;
    let products = repo.products_in(id).await?;

    Ok(Json(json!({
        "success": true,
        "category": CategoryWithProducts { category, products },
    })))
}

#[derive(Debug, Deserialize)]
pub struct CategoryRequest {
    name: Option<String>,
    description: Option<String>,
    parent_id: Option<i32>,
}

impl CategoryRequest {
    fn into_input(self) -> Result<NewCategory> {
        let name = self
            .name
            .filter(|n| !n.trim().is_empty())
            .ok_or_else(|| AppError::Validation("Category name required".to_string()))?;

        Ok(NewCategory {
            category_name: name,
            description: self.description,
            parent_id: self.parent_id.map(CategoryId::new),
        })
    }
}

/// `POST /api/categories` (admin)
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    Json(body): Json<CategoryRequest>,
) -> Result<impl IntoResponse> {
    let input = body.into_input()?;
    let category_id = CategoryRepository::new(state.pool()).create(&input).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Category created successfully",
            "categoryId": category_id,
        })),
    ))
}

/// `PUT /api/categories/{id}` (admin)
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    Path(id): Path<i32>,
    Json(body): Json<CategoryRequest>,
) -> Result<impl IntoResponse> {
    let input = body.into_input()?;

    CategoryRepository::new(state.pool())
        .update(CategoryId::new(id), &input)
        .await
        .map_err(not_found_as_category)?;

    Ok(Json(json!({
        "success": true,
        "message": "Category updated successfully",
    })))
}

/// `DELETE /api/categories/{id}` (admin)
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse> {
    CategoryRepository::new(state.pool())
        .delete(CategoryId::new(id))
        .await
        .map_err(not_found_as_category)?;

    Ok(Json(json!({
        "success": true,
        "message": "Category deleted successfully",
    })))
}

fn not_found_as_category(err: RepositoryError) -> AppError {
    match err {
        RepositoryError::NotFound => AppError::NotFound("Category not found".to_string()),
        other => AppError::Database(other),
    }
}
