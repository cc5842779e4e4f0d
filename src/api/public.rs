//! Public API types

use axum::Json;
use axum::response::{IntoResponse, Response};
use http::StatusCode;
use serde::{Deserialize, Serialize};

use crate::payments::PaymentError;

// Errors

/// Body of every error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub kind: String,
    pub retryable: bool,
}

pub struct ApiError(anyhow::Error);

fn status_for(err: &PaymentError) -> StatusCode {
    match err {
        PaymentError::Validation(_) | PaymentError::VerificationFailure => StatusCode::BAD_REQUEST,
        PaymentError::CredentialsUnavailable(_) => StatusCode::UNAUTHORIZED,
        PaymentError::Search(_) | PaymentError::FetchFailure { .. } => StatusCode::BAD_GATEWAY,
    }
}

/// Convert `ApiError` into an Axum compatible response.
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match self.0.downcast_ref::<PaymentError>() {
            Some(err) => {
                // Rejected claims are routine, only log them at info
                match err {
                    PaymentError::Validation(_) | PaymentError::VerificationFailure => {
                        tracing::info!("{}", err)
                    }
                    _ => tracing::error!("{}", err),
                }
                (
                    status_for(err),
                    ErrorBody {
                        error: err.to_string(),
                        kind: err.kind().to_string(),
                        retryable: err.is_retryable(),
                    },
                )
            }
            None => {
                tracing::error!("{:#}", self.0);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody {
                        error: format!("Something went wrong: {}", self.0),
                        kind: "internal_error".to_string(),
                        retryable: false,
                    },
                )
            }
        };

        (body.0, Json(body.1)).into_response()
    }
}

/// Enables using `?` on functions that return `Result<_,
/// anyhow::Error>` or `Result<_, PaymentError>` to turn them into
/// `Result<_, ApiError>`
impl<E> From<E> for ApiError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

// Re-export public types from each route

pub mod admin {
    pub use crate::api::routes::admin::public::*;
}

pub mod payments {
    pub use crate::api::routes::payments::public::*;
}

pub mod submissions {
    pub use crate::api::routes::submissions::public::*;
}
