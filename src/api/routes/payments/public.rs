//! Public types for the scan API
use serde::{Deserialize, Serialize};

use crate::payments::EvidenceRecord;

#[derive(Deserialize)]
pub struct ScanQuery {
    /// Overrides the configured number of messages to search
    pub limit: Option<usize>,
}

#[derive(Serialize, Deserialize)]
pub struct ScanPaymentsResponse {
    pub success: bool,
    pub payments: Vec<EvidenceRecord>,
}
