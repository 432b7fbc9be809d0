//! Application services.
//!
//! Services own the business rules and sit between route handlers and the
//! repositories in [`crate::db`].

pub mod auth;
pub mod checkout;
pub mod tokens;
