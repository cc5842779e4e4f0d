//! Router for the admin API

use std::sync::Arc;

use axum::{Json, Router, extract::State};

use super::public::AdminSnapshot;
use crate::api::state::AppState;

type SharedState = Arc<AppState>;

async fn admin_data_handler(State(state): State<SharedState>) -> Json<AdminSnapshot> {
    Json(state.payments.admin_snapshot())
}

/// Create the admin router
pub fn router() -> Router<SharedState> {
    Router::new().route("/admin-data", axum::routing::get(admin_data_handler))
}
