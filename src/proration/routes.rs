//! JSON API for the proration engine

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};

use crate::AppState;

use super::calculators::prorate_bill;
use super::requests::CalculateProrationRequest;
use super::responses::{ProrationErrorResponse, ProrationResponse};

/// Routes mounted under `/api`
pub fn router() -> Router<AppState> {
    Router::new().route("/prorate", post(calculate))
}

/// Prorate a bill supplied as JSON
async fn calculate(Json(request): Json<CalculateProrationRequest>) -> Response {
    let input = match request.into_input() {
        Ok(input) => input,
        Err(e) => {
            tracing::debug!("Rejected proration request: {}", e);
            let body = ProrationErrorResponse {
                error_type: "invalid_request".to_string(),
                message: e.to_string(),
                details: None,
            };
            return (StatusCode::UNPROCESSABLE_ENTITY, Json(body)).into_response();
        }
    };

    match prorate_bill(&input) {
        Ok(result) => {
            tracing::debug!(
                items = result.items.len(),
                fees = input.other_fees.len(),
                "Prorated bill via API"
            );
            Json(ProrationResponse::from(result)).into_response()
        }
        Err(e) => {
            tracing::warn!("Proration failed: {}", e);
            (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(ProrationErrorResponse::from(&e)),
            )
                .into_response()
        }
    }
}
