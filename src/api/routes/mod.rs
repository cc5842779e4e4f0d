//! API routes module

pub mod admin;
pub mod payments;
pub mod submissions;

use std::sync::Arc;

use crate::api::state::AppState;
use axum::Router;

type SharedState = Arc<AppState>;

/// Create the combined API router
pub fn router() -> Router<SharedState> {
    Router::new()
        // Inbox scanning
        .merge(payments::router())
        // Claim submission
        .merge(submissions::router())
        // Read-only dump of evidence and submissions
        .merge(admin::router())
}
