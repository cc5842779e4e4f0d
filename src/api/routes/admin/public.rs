//! Public types for the admin API
pub use crate::payments::AdminSnapshot;
