//! Scan cycle: fetch each candidate message, classify it, and record the
//! ones that look like payments.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::Mutex;

use super::PaymentError;
use super::classify::is_payment_evidence;
use super::evidence::{EvidenceRecord, EvidenceSet};
use super::mailbox::{MessageFetch, MessageRef};

pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(15);

/// Counters for a single `collect` call
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CollectOutcome {
    pub examined: usize,
    pub matched: usize,
    pub inserted: usize,
}

pub struct EvidenceCollector {
    evidence: Arc<EvidenceSet>,
    // Held for the whole of a scan so overlapping scans run one after
    // the other
    scan_lock: Mutex<()>,
    fetch_timeout: Duration,
}

impl EvidenceCollector {
    pub fn new(evidence: Arc<EvidenceSet>, fetch_timeout: Duration) -> Self {
        Self {
            evidence,
            scan_lock: Mutex::new(()),
            fetch_timeout,
        }
    }

    /// Shared read handle on the evidence this collector appends to
    pub fn evidence(&self) -> Arc<EvidenceSet> {
        Arc::clone(&self.evidence)
    }

    /// Run one scan cycle over `messages` in the order given.
    ///
    /// Fetches are sequential. The first fetch that fails or exceeds the
    /// timeout aborts the rest of the cycle; evidence recorded before the
    /// failure is kept. A fetch that fails because the mailbox lost its
    /// authorization is reported as `CredentialsUnavailable`.
    pub async fn collect<F>(
        &self,
        messages: Vec<MessageRef>,
        fetch: &F,
    ) -> Result<CollectOutcome, PaymentError>
    where
        F: MessageFetch + ?Sized,
    {
        let _guard = self.scan_lock.lock().await;
        let mut outcome = CollectOutcome::default();

        for message in messages {
            let body = match tokio::time::timeout(self.fetch_timeout, fetch.fetch(&message)).await
            {
                Ok(Ok(body)) => body,
                Ok(Err(e)) => {
                    return Err(PaymentError::credentials_lost(&e)
                        .unwrap_or_else(|| PaymentError::fetch(&message.id, format!("{:#}", e))));
                }
                Err(_) => {
                    return Err(PaymentError::fetch(
                        &message.id,
                        format!("timed out after {:?}", self.fetch_timeout),
                    ));
                }
            };
            outcome.examined += 1;

            if !is_payment_evidence(&body.snippet) {
                continue;
            }
            outcome.matched += 1;

            if self.evidence.contains(&message.id) {
                continue;
            }
            let record = EvidenceRecord::from_message(&message, body)?;
            if self.evidence.insert(record) {
                tracing::debug!("Recorded payment evidence from message {}", message.id);
                outcome.inserted += 1;
            }
        }

        Ok(outcome)
    }
}
