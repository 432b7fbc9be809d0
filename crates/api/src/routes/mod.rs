//! HTTP route handlers.
//!
//! ## Route table
//!
//! | Method | Path | Auth | Handler |
//! |--------|------|------|---------|
//! | POST | `/api/auth/register` | - | [`auth::register`] |
//! | POST | `/api/auth/login` | - | [`auth::login`] |
//! | GET | `/api/auth/profile` | bearer | [`auth::profile`] |
//! | GET | `/api/products` | - | [`products::list`] |
//! | GET | `/api/products/{id}` | - | [`products::get_one`] |
//! | POST | `/api/products` | admin | [`products::create`] |
//! | PUT | `/api/products/{id}` | admin | [`products::update`] |
//! | DELETE | `/api/products/{id}` | admin | [`products::delete`] |
//! | POST | `/api/products/{id}/reviews` | bearer | [`products::add_review`] |
//! | GET | `/api/categories` | - | [`categories::list`] |
//! | GET | `/api/categories/{id}` | - | [`categories::get_one`] |
//! | POST | `/api/categories` | admin | [`categories::create`] |
//! | PUT | `/api/categories/{id}` | admin | [`categories::update`] |
//! | DELETE | `/api/categories/{id}` | admin | [`categories::delete`] |
//! | GET | `/api/cart` | bearer | [`cart::list`] |
//! | POST | `/api/cart` | bearer | [`cart::add`] |
//! | PUT | `/api/cart/{id}` | bearer | [`cart::update`] |
//! | DELETE | `/api/cart/{id}` | bearer | [`cart::remove`] |
//! | DELETE | `/api/cart` | bearer | [`cart::clear`] |
//! | POST | `/api/orders` | bearer | [`orders::checkout`] |
//! | GET | `/api/orders` | bearer | [`orders::list_mine`] |
//! | GET | `/api/orders/all` | admin | [`orders::list_all`] |
//! | GET | `/api/orders/{id}` | bearer (owner) | [`orders::detail`] |
//! | PUT | `/api/orders/{id}/status` | admin | [`orders::update_status`] |

pub mod auth;
pub mod cart;
pub mod categories;
pub mod orders;
pub mod products;

use axum::Router;

use crate::state::AppState;

/// Build the `/api` router.
pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/api/auth", auth::router())
        .nest("/api/products", products::router())
        .nest("/api/categories", categories::router())
        .nest("/api/cart", cart::router())
        .nest("/api/orders", orders::router())
}
