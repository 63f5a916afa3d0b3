//! HTTP routes

pub mod auth;
pub mod dashboard;
pub mod health;

use std::sync::Arc;

use axum::routing::get;
use axum::Router;

use crate::context::AppContext;

/// Build the application router
pub fn build_router(context: Arc<AppContext>) -> Router {
    Router::new()
        .route("/auth/login", get(auth::login))
        .route("/auth/callback", get(auth::callback))
        .route("/auth/logout", get(auth::logout))
        .route("/api/dashboard", get(dashboard::dashboard))
        .route("/healthz", get(health::healthz))
        .with_state(context)
}
