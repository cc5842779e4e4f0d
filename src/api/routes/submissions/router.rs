//! Router for the submission API

use std::sync::Arc;

use axum::{Json, Router, extract::State};

use super::public::{SubmissionAck, SubmissionClaim};
use crate::api::public::ApiError;
use crate::api::state::AppState;

type SharedState = Arc<AppState>;

/// Accept a claim when the email or transaction id shows up in the
/// collected payment evidence
async fn submit_handler(
    State(state): State<SharedState>,
    Json(claim): Json<SubmissionClaim>,
) -> Result<Json<SubmissionAck>, ApiError> {
    let ack = state.payments.submit_claim(claim)?;
    Ok(Json(ack))
}

/// Create the submission router
pub fn router() -> Router<SharedState> {
    Router::new().route("/submit", axum::routing::post(submit_handler))
}
