//! HTML route handlers

pub mod prorate;

use axum::response::Redirect;

use crate::error::AppError;

/// Homepage goes straight to the calculator
pub async fn home() -> Redirect {
    Redirect::to("/prorate-bill")
}

/// Liveness probe
pub async fn health() -> &'static str {
    "ok"
}

/// Fallback for unknown paths
pub async fn not_found() -> AppError {
    AppError::NotFound
}
