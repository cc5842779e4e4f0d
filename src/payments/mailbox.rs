//! Capabilities the engine consumes from a mail provider

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::PaymentError;

/// Disjunctive subject filter used to narrow the inbox before
/// classification
pub const DEFAULT_QUERY: &str = "subject:payment OR transaction OR upi OR credited OR received";
pub const DEFAULT_SCAN_LIMIT: usize = 30;

/// Reference to a message returned by a search
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageRef {
    pub id: String,
}

impl MessageRef {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

/// The parts of a full message the classifier looks at
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageBody {
    pub snippet: String,
    /// Milliseconds since the epoch, as a decimal string
    pub internal_date: String,
}

#[async_trait]
pub trait MessageSearch: Send + Sync {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<MessageRef>>;
}

#[async_trait]
pub trait MessageFetch: Send + Sync {
    async fn fetch(&self, message: &MessageRef) -> Result<MessageBody>;
}

/// An authorized handle that can both search and fetch
pub trait Mailbox: MessageSearch + MessageFetch {}

impl<T: MessageSearch + MessageFetch> Mailbox for T {}

/// Produces a mailbox handle. How the credential is obtained (cached
/// refresh token, service account, ...) is up to the implementation;
/// any failure must be reported as `CredentialsUnavailable`.
#[async_trait]
pub trait Authorizer: Send + Sync {
    async fn authorize(&self) -> Result<Arc<dyn Mailbox>, PaymentError>;
}
