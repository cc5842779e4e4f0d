//! Router for the scan API

use std::sync::Arc;

use axum::{Router, extract::State, response::Json};
use axum_extra::extract::Query;

use super::public;
use crate::api::public::ApiError;
use crate::api::state::AppState;

type SharedState = Arc<AppState>;

/// Run one scan cycle and return every payment collected so far
async fn scan_payments_handler(
    State(state): State<SharedState>,
    Query(params): Query<public::ScanQuery>,
) -> Result<Json<public::ScanPaymentsResponse>, ApiError> {
    let service = Arc::clone(&state.payments);
    let report = match params.limit {
        Some(limit) => service.run_scan_with_limit(limit).await?,
        None => service.run_scan().await?,
    };

    Ok(Json(public::ScanPaymentsResponse {
        success: true,
        payments: report.payments,
    }))
}

/// Create the scan router
pub fn router() -> Router<SharedState> {
    Router::new().route("/scan-payments", axum::routing::get(scan_payments_handler))
}
