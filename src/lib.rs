//! Prorate Bill - split a discounted bill and its extra fees across line items
//!
//! This library provides:
//! - The proration engine (`proration::prorate_bill`)
//! - Bill form state with add/remove/calculate commands
//! - The Axum router serving the calculator page and JSON API

pub mod config;
pub mod error;
pub mod models;
pub mod proration;
pub mod routes;

use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

pub use config::Config;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            config: Arc::new(config),
        }
    }
}

/// Build the application router
pub fn create_router(state: AppState) -> Router {
    let api = proration::router().layer(
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any),
    );

    Router::new()
        .route("/", get(routes::home))
        .route("/health", get(routes::health))
        .route(
            "/prorate-bill",
            get(routes::prorate::show).post(routes::prorate::submit),
        )
        .nest("/api", api)
        .nest_service("/static", ServeDir::new("static"))
        .fallback(routes::not_found)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
