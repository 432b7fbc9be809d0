//! Domain types returned by repositories and serialized into responses.
//!
//! These types are separate from the database row types, which live next to
//! the queries in [`crate::db`].

pub mod cart;
pub mod category;
pub mod order;
pub mod product;
pub mod user;

pub use cart::{CartItemDetail, CartLine};
pub use category::{Category, CategoryWithProducts, NewCategory};
pub use order::{
    CheckoutInput, CheckoutSummary, Order, OrderDetail, OrderItemDetail, OrderWithAddress,
    OrderWithCustomer,
};
pub use product::{NewProduct, Product, ProductFilter, ProductWithCategory, Review, ReviewWithAuthor};
pub use user::{NewUser, User};
