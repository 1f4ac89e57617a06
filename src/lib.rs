//! Moving-cost estimation service.
//!
//! Customers submit prefectures, moving month, item counts and optional
//! services; the [`estimate`] module prices the move and, on confirmation,
//! stores the order.

pub mod cache;
pub mod config;
pub mod error;
pub mod estimate;

use axum::{routing::get, Router};
use sqlx::PgPool;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::cache::AppCache;
use crate::estimate::PricingConfig;

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub cache: AppCache,
    pub pricing: PricingConfig,
}

/// Build the application router
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .nest("/api", estimate::router())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
