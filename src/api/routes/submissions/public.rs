//! Public types for the submission API
pub use crate::payments::{SubmissionAck, SubmissionClaim};
