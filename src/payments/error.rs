//! Error kinds surfaced by the payment evidence engine

use thiserror::Error;

/// Every failure a scan or a submission can end in. Callers match on
/// the variant (or `kind()`) to decide how to respond; nothing here is
/// logged and dropped.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PaymentError {
    /// No usable mailbox authorization could be produced
    #[error("Mailbox not authorized: {0}")]
    CredentialsUnavailable(String),

    /// Listing candidate messages failed before any fetch happened
    #[error("Message search failed: {0}")]
    Search(String),

    /// A message body could not be retrieved, aborting the scan cycle
    #[error("Failed to fetch message {id}: {reason}")]
    FetchFailure { id: String, reason: String },

    /// The claim is missing required fields
    #[error("{0}")]
    Validation(String),

    /// The claim matched no evidence collected so far
    #[error("Payment not detected. Please wait or try again later.")]
    VerificationFailure,
}

impl PaymentError {
    pub fn fetch(id: &str, reason: impl ToString) -> Self {
        PaymentError::FetchFailure {
            id: id.to_string(),
            reason: reason.to_string(),
        }
    }

    /// The credential failure carried by a mailbox error, if any. Mailbox
    /// implementations report a revoked or expired authorization by
    /// returning `CredentialsUnavailable` inside their `anyhow` error.
    pub fn credentials_lost(err: &anyhow::Error) -> Option<Self> {
        match err.downcast_ref::<PaymentError>() {
            Some(PaymentError::CredentialsUnavailable(reason)) => {
                Some(PaymentError::CredentialsUnavailable(reason.clone()))
            }
            _ => None,
        }
    }

    /// Stable identifier used in API error bodies
    pub fn kind(&self) -> &'static str {
        match self {
            PaymentError::CredentialsUnavailable(_) => "credentials_unavailable",
            PaymentError::Search(_) => "search_failure",
            PaymentError::FetchFailure { .. } => "fetch_failure",
            PaymentError::Validation(_) => "validation_error",
            PaymentError::VerificationFailure => "verification_failure",
        }
    }

    /// Whether repeating the same request later may succeed without the
    /// caller changing anything.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            PaymentError::VerificationFailure
                | PaymentError::Search(_)
                | PaymentError::FetchFailure { .. }
        )
    }
}
