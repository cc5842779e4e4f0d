//! Checking a submitted claim against collected evidence

use std::sync::RwLock;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use super::PaymentError;
use super::evidence::{EvidenceLookup, EvidenceRecord};

/// What a user says they paid with. Missing and `null` fields
/// deserialize as empty so they are reported by validation rather than
/// rejected by the decoder.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionClaim {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub email: String,
    #[serde(default, rename = "txnId")]
    pub txn_id: Option<String>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl SubmissionClaim {
    pub fn new(name: &str, email: &str, txn_id: Option<&str>) -> Self {
        Self {
            name: name.to_string(),
            email: email.to_string(),
            txn_id: txn_id.map(String::from),
        }
    }

    fn validate(&self) -> Result<(), PaymentError> {
        if self.name.trim().is_empty() || self.email.trim().is_empty() {
            return Err(PaymentError::Validation(
                "Name and Email required".to_string(),
            ));
        }
        Ok(())
    }
}

/// An accepted claim
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionRecord {
    pub name: String,
    pub email: String,
    pub txn_id: Option<String>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Default)]
pub struct SubmissionLog {
    records: RwLock<Vec<SubmissionRecord>>,
}

impl SubmissionLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&self, record: SubmissionRecord) {
        self.records
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .push(record);
    }

    pub fn snapshot(&self) -> Vec<SubmissionRecord> {
        self.records
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn len(&self) -> usize {
        self.records.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Whether `record` backs the claim: its snippet contains the
/// transaction id or the email, compared case-insensitively after
/// trimming. Blank fields never match.
pub fn record_matches(claim: &SubmissionClaim, record: &EvidenceRecord) -> bool {
    let snippet = record.snippet.to_lowercase();
    let contains = |needle: &str| {
        let needle = needle.trim();
        !needle.is_empty() && snippet.contains(&needle.to_lowercase())
    };
    claim.txn_id.as_deref().is_some_and(contains) || contains(&claim.email)
}

pub fn verify<E>(claim: &SubmissionClaim, evidence: &E) -> bool
where
    E: EvidenceLookup + ?Sized,
{
    evidence
        .find_match(&|record: &EvidenceRecord| record_matches(claim, record))
        .is_some()
}

/// Validate, verify and log a claim. Validation runs before the
/// evidence is touched.
pub fn accept_claim<E>(
    claim: SubmissionClaim,
    evidence: &E,
    log: &SubmissionLog,
) -> Result<SubmissionRecord, PaymentError>
where
    E: EvidenceLookup + ?Sized,
{
    claim.validate()?;

    if !verify(&claim, evidence) {
        return Err(PaymentError::VerificationFailure);
    }

    let record = SubmissionRecord {
        name: claim.name,
        email: claim.email,
        txn_id: claim.txn_id,
        timestamp: Utc::now(),
    };
    log.append(record.clone());
    Ok(record)
}
