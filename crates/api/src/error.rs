//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. All route handlers should return `Result<T, AppError>`.
//!
//! Every error response carries the uniform envelope
//! `{"success": false, "message": "..."}`. Infrastructure errors additionally
//! carry an `error` field with diagnostic detail, matching the behavior the
//! API has always had. No failure is ever retried; each one is terminal for
//! its request.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::auth::AuthError;
use crate::services::checkout::CheckoutError;

/// Application-level error type for the API.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Checkout workflow failed.
    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutError),

    /// Missing or invalid input.
    #[error("Bad request: {0}")]
    Validation(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Missing or invalid bearer credential.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Authenticated but lacking the required role.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// JSON body of every error response.
#[derive(Debug, Serialize)]
struct ErrorBody {
    success: bool,
    message: String,
    /// Diagnostic detail, only present on infrastructure (500) errors.
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl AppError {
    /// HTTP status for this error.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Database(err) => match err {
                RepositoryError::NotFound => StatusCode::NOT_FOUND,
                RepositoryError::Conflict(_) => StatusCode::BAD_REQUEST,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Auth(err) => match err {
                AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
                AuthError::EmailTaken
                | AuthError::InvalidEmail(_)
                | AuthError::WeakPassword(_)
                | AuthError::MissingFields(_) => StatusCode::BAD_REQUEST,
                AuthError::UserNotFound => StatusCode::NOT_FOUND,
                AuthError::PasswordHash | AuthError::Repository(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::Checkout(err) => match err {
                CheckoutError::EmptyCart | CheckoutError::InsufficientStock(_) => {
                    StatusCode::BAD_REQUEST
                }
                CheckoutError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Client-facing message for this error.
    fn message(&self) -> String {
        match self {
            Self::Database(err) => match err {
                RepositoryError::NotFound => "Not found".to_string(),
                RepositoryError::Conflict(msg) => msg.clone(),
                _ => "Server error".to_string(),
            },
            Self::Auth(err) => match err {
                AuthError::InvalidCredentials => "Invalid credentials".to_string(),
                AuthError::EmailTaken => "Email already registered".to_string(),
                AuthError::InvalidEmail(_) => "Invalid email format".to_string(),
                AuthError::WeakPassword(msg) => msg.clone(),
                AuthError::MissingFields(fields) => {
                    format!("Missing required fields: {}", fields.join(", "))
                }
                AuthError::UserNotFound => "User not found".to_string(),
                AuthError::PasswordHash | AuthError::Repository(_) => "Server error".to_string(),
            },
            Self::Checkout(err) => match err {
                CheckoutError::EmptyCart => "Cart is empty".to_string(),
                CheckoutError::InsufficientStock(product_id) => {
                    format!("Insufficient stock for product ID {product_id}")
                }
                CheckoutError::Repository(_) => "Server error".to_string(),
            },
            Self::Internal(_) => "Server error".to_string(),
            Self::Validation(msg)
            | Self::NotFound(msg)
            | Self::Unauthorized(msg)
            | Self::Forbidden(msg) => msg.clone(),
        }
    }

    /// Whether this error is infrastructure-class (captured to Sentry,
    /// diagnostic detail surfaced to the caller).
    fn is_infrastructure(&self) -> bool {
        self.status() == StatusCode::INTERNAL_SERVER_ERROR
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        let error_detail = if self.is_infrastructure() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
            Some(self.to_string())
        } else {
            None
        };

        let body = ErrorBody {
            success: false,
            message: self.message(),
            error: error_detail,
        };

        (self.status(), Json(body)).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use clementine_core::ProductId;

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("Product not found".to_string());
        assert_eq!(err.to_string(), "Not found: Product not found");

        let err = AppError::Validation("Valid quantity required".to_string());
        assert_eq!(err.to_string(), "Bad request: Valid quantity required");
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(
            AppError::Validation("test".to_string()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::NotFound("test".to_string()).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::Unauthorized("test".to_string()).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::Forbidden("test".to_string()).status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AppError::Internal("test".to_string()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_business_rule_errors_are_bad_requests() {
        assert_eq!(
            AppError::Checkout(CheckoutError::EmptyCart).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::Checkout(CheckoutError::InsufficientStock(ProductId::new(7))).status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_insufficient_stock_names_offending_product() {
        let err = AppError::Checkout(CheckoutError::InsufficientStock(ProductId::new(42)));
        assert_eq!(err.message(), "Insufficient stock for product ID 42");
    }

    #[test]
    fn test_envelope_shape() {
        let body = ErrorBody {
            success: false,
            message: "Cart is empty".to_string(),
            error: None,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"success": false, "message": "Cart is empty"})
        );
    }

    #[test]
    fn test_envelope_carries_detail_for_infrastructure_errors() {
        let body = ErrorBody {
            success: false,
            message: "Server error".to_string(),
            error: Some("Internal error: pool exhausted".to_string()),
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["error"], "Internal error: pool exhausted");
    }
}
