//! # RDA Server
//!
//! `axum` HTTP surface for the EVE login flow and the character dashboard.
//!
//! - `context`: wires configuration into adapters and services
//! - `routes`: login, callback, logout, dashboard and health endpoints
//! - `cookies`: attempt and session cookie handling
//! - `utils`: logging initialisation and helpers

pub mod context;
pub mod cookies;
pub mod routes;
pub mod utils;

pub use context::AppContext;
pub use routes::build_router;
