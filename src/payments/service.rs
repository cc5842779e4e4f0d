//! Application context tying scanning, verification and authorization
//! together. One instance lives for the lifetime of the process.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::Mutex;

use super::PaymentError;
use super::collector::{CollectOutcome, EvidenceCollector};
use super::evidence::{EvidenceRecord, EvidenceSet};
use super::mailbox::{Authorizer, DEFAULT_QUERY, DEFAULT_SCAN_LIMIT, Mailbox};
use super::verifier::{SubmissionClaim, SubmissionLog, SubmissionRecord, accept_claim};

/// Evidence after a scan together with what that scan did
#[derive(Debug, Clone, Serialize)]
pub struct ScanReport {
    pub payments: Vec<EvidenceRecord>,
    pub outcome: CollectOutcome,
}

#[derive(Debug, Clone, Serialize)]
pub struct SubmissionAck {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AdminSnapshot {
    pub payments: Vec<EvidenceRecord>,
    pub submissions: Vec<SubmissionRecord>,
}

enum AuthState {
    Unauthorized,
    Authorized(Arc<dyn Mailbox>),
}

#[derive(Debug, Clone)]
pub struct ScanSettings {
    pub query: String,
    pub limit: usize,
    pub fetch_timeout: Duration,
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            query: DEFAULT_QUERY.to_string(),
            limit: DEFAULT_SCAN_LIMIT,
            fetch_timeout: super::collector::DEFAULT_FETCH_TIMEOUT,
        }
    }
}

pub struct PaymentService {
    collector: EvidenceCollector,
    submissions: SubmissionLog,
    authorizer: Arc<dyn Authorizer>,
    auth: Mutex<AuthState>,
    query: String,
    limit: usize,
}

impl PaymentService {
    pub fn new(authorizer: Arc<dyn Authorizer>, settings: ScanSettings) -> Self {
        let evidence = Arc::new(EvidenceSet::new());
        Self {
            collector: EvidenceCollector::new(evidence, settings.fetch_timeout),
            submissions: SubmissionLog::new(),
            authorizer,
            auth: Mutex::new(AuthState::Unauthorized),
            query: settings.query,
            limit: settings.limit,
        }
    }

    /// The mailbox handle, authorizing on first use. A failed attempt
    /// leaves the service unauthorized so the next scan tries again.
    async fn mailbox(&self) -> Result<Arc<dyn Mailbox>, PaymentError> {
        let mut auth = self.auth.lock().await;
        if let AuthState::Authorized(mailbox) = &*auth {
            return Ok(Arc::clone(mailbox));
        }

        let mailbox = self.authorizer.authorize().await?;
        tracing::info!("Mailbox authorized");
        *auth = AuthState::Authorized(Arc::clone(&mailbox));
        Ok(mailbox)
    }

    pub async fn is_authorized(&self) -> bool {
        matches!(*self.auth.lock().await, AuthState::Authorized(_))
    }

    pub async fn run_scan(&self) -> Result<ScanReport, PaymentError> {
        self.run_scan_with_limit(self.limit).await
    }

    /// Search the mailbox and run one collection cycle over the results.
    /// When the mailbox reports lost credentials the service drops the
    /// handle and the next scan authorizes again.
    pub async fn run_scan_with_limit(&self, limit: usize) -> Result<ScanReport, PaymentError> {
        let mailbox = self.mailbox().await?;

        match self.scan_mailbox(mailbox.as_ref(), limit).await {
            Err(PaymentError::CredentialsUnavailable(reason)) => {
                tracing::warn!("Mailbox authorization lost: {}", reason);
                *self.auth.lock().await = AuthState::Unauthorized;
                Err(PaymentError::CredentialsUnavailable(reason))
            }
            result => result,
        }
    }

    async fn scan_mailbox(
        &self,
        mailbox: &dyn Mailbox,
        limit: usize,
    ) -> Result<ScanReport, PaymentError> {
        let messages = mailbox.search(&self.query, limit).await.map_err(|e| {
            PaymentError::credentials_lost(&e)
                .unwrap_or_else(|| PaymentError::Search(format!("{:#}", e)))
        })?;
        tracing::debug!("Scanning {} candidate messages", messages.len());

        let outcome = self.collector.collect(messages, mailbox).await?;
        tracing::info!(
            "Scan complete: examined={} matched={} new={}",
            outcome.examined,
            outcome.matched,
            outcome.inserted
        );

        Ok(ScanReport {
            payments: self.collector.evidence().snapshot(),
            outcome,
        })
    }

    pub fn submit_claim(&self, claim: SubmissionClaim) -> Result<SubmissionAck, PaymentError> {
        let evidence = self.collector.evidence();
        let record = accept_claim(claim, evidence.as_ref(), &self.submissions)?;
        tracing::info!("Accepted payment claim from {}", record.email);

        Ok(SubmissionAck {
            success: true,
            message: "Payment verified. Form submitted!".to_string(),
        })
    }

    pub fn admin_snapshot(&self) -> AdminSnapshot {
        AdminSnapshot {
            payments: self.collector.evidence().snapshot(),
            submissions: self.submissions.snapshot(),
        }
    }
}
