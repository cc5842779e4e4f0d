//! Payment evidence engine: scan a mailbox for payment notifications and
//! verify user claims against what was found.

pub mod classify;
pub mod collector;
mod error;
pub mod evidence;
pub mod mailbox;
pub mod service;
pub mod verifier;

pub use classify::is_payment_evidence;
pub use collector::{CollectOutcome, EvidenceCollector};
pub use error::PaymentError;
pub use evidence::{EvidenceLookup, EvidenceRecord, EvidenceSet};
pub use mailbox::{Authorizer, Mailbox, MessageBody, MessageFetch, MessageRef, MessageSearch};
pub use service::{AdminSnapshot, PaymentService, ScanReport, ScanSettings, SubmissionAck};
pub use verifier::{SubmissionClaim, SubmissionLog, SubmissionRecord, accept_claim, verify};
