//! Clementine API library.
//!
//! This crate provides the store API as a library, allowing it to be tested
//! and reused. The binary in `main.rs` wires it to configuration, logging,
//! and a listening socket.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
