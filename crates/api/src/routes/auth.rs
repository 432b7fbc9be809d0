//! Authentication routes: register, login, profile.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;

use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::services::auth::{AuthError, AuthService};
use crate::state::AppState;

/// Build the auth router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/profile", get(profile))
}

/// Drop values that are absent or blank after trimming.
fn present(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    email: Option<String>,
    password: Option<String>,
    #[serde(alias = "firstName")]
    first_name: Option<String>,
    #[serde(alias = "lastName")]
    last_name: Option<String>,
    phone: Option<String>,
}

/// `POST /api/auth/register`
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<impl IntoResponse> {
    // Blank and whitespace-only values count as missing.
    let email = present(body.email);
    let password = present(body.password);
    let first_name = present(body.first_name);
    let last_name = present(body.last_name);

    let mut missing = Vec::new();
    if email.is_none() {
        missing.push("email".to_string());
    }
    if password.is_none() {
        missing.push("password".to_string());
    }
    if first_name.is_none() {
        missing.push("first_name".to_string());
    }
    if last_name.is_none() {
        missing.push("last_name".to_string());
    }
    let (Some(email), Some(password), Some(first_name), Some(last_name)) =
        (email, password, first_name, last_name)
    else {
        return Err(AuthError::MissingFields(missing).into());
    };

    let auth = AuthService::new(state.pool());
    let user_id = auth
        .register(&email, &password, &first_name, &last_name, body.phone)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "User registered successfully",
            "userId": user_id,
        })),
    ))
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    email: Option<String>,
    password: Option<String>,
}

/// `POST /api/auth/login`
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<impl IntoResponse> {
    let (Some(email), Some(password)) = (present(body.email), present(body.password)) else {
        return Err(AppError::Validation(
            "Email and password required".to_string(),
        ));
    };

    let auth = AuthService::new(state.pool());
    let user = auth.login(&email, &password).await?;

    let token = state
        .tokens()
        .issue(user.user_id, user.role)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(Json(json!({
        "success": true,
        "message": "Login successful",
        "token": token,
        "user": {
            "userId": user.user_id,
            "email": user.email,
            "firstName": user.first_name,
            "lastName": user.last_name,
            "role": user.role,
        },
    })))
}

/// `GET /api/auth/profile`
pub async fn profile(
    State(state): State<AppState>,
    RequireAuth(ctx): RequireAuth,
) -> Result<impl IntoResponse> {
    let auth = AuthService::new(state.pool());
    let user = auth.profile(ctx.user_id).await?;

    Ok(Json(json!({
        "success": true,
        "user": user,
    })))
}
