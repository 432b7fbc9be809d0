//! Bearer authentication extractors.
//!
//! Handlers declare their authentication requirement in their signature:
//! [`RequireAuth`] for any signed-in user, [`RequireAdmin`] for admin-only
//! routes. Both reject before the handler body runs.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use clementine_core::{Role, UserId};

use crate::error::AppError;
use crate::state::AppState;

/// Verified identity of the caller, extracted from the bearer token.
#[derive(Debug, Clone, Copy)]
pub struct AuthContext {
    pub user_id: UserId,
    pub role: Role,
}

/// Extractor that requires a valid bearer token.
#[derive(Debug, Clone, Copy)]
pub struct RequireAuth(pub AuthContext);

/// Extractor that requires a valid bearer token with the admin role.
#[derive(Debug, Clone, Copy)]
pub struct RequireAdmin(pub AuthContext);

fn bearer_token(parts: &Parts) -> Result<&str, AppError> {
    let header = parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))?;

    header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))
}

fn authenticate(parts: &Parts, state: &AppState) -> Result<AuthContext, AppError> {
    let token = bearer_token(parts)?;
    let claims = state
        .tokens()
        .verify(token)
        .map_err(|_| AppError::Unauthorized("Invalid token".to_string()))?;

    Ok(AuthContext {
        user_id: claims.sub,
        role: claims.role,
    })
}

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        authenticate(parts, state).map(Self)
    }
}

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let ctx = authenticate(parts, state)?;

        if !ctx.role.is_admin() {
            return Err(AppError::Forbidden("Admin access required".to_string()));
        }

        Ok(Self(ctx))
    }
}
