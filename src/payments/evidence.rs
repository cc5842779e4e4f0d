//! Evidence records and the process-lifetime set that accumulates them

use std::collections::HashSet;
use std::sync::RwLock;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::PaymentError;
use super::mailbox::{MessageBody, MessageRef};

/// One message that was classified as payment evidence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvidenceRecord {
    pub id: String,
    /// Stored as received; matching lower-cases it on the fly
    pub snippet: String,
    pub timestamp: DateTime<Utc>,
}

impl EvidenceRecord {
    /// Build a record from a fetched message, converting the provider's
    /// epoch-millisecond `internal_date` into a timestamp.
    pub fn from_message(message: &MessageRef, body: MessageBody) -> Result<Self, PaymentError> {
        let millis: i64 = body.internal_date.trim().parse().map_err(|_| {
            PaymentError::fetch(
                &message.id,
                format!("invalid internalDate {:?}", body.internal_date),
            )
        })?;
        let timestamp = DateTime::from_timestamp_millis(millis).ok_or_else(|| {
            PaymentError::fetch(&message.id, format!("internalDate {} out of range", millis))
        })?;

        Ok(Self {
            id: message.id.clone(),
            snippet: body.snippet,
            timestamp,
        })
    }
}

/// Read access to evidence used by verification
pub trait EvidenceLookup {
    /// First record, in insertion order, satisfying `predicate`
    fn find_match(&self, predicate: &dyn Fn(&EvidenceRecord) -> bool) -> Option<EvidenceRecord>;
}

#[derive(Default)]
struct Inner {
    records: Vec<EvidenceRecord>,
    ids: HashSet<String>,
}

/// Ordered, append-only collection of evidence keyed by message id.
///
/// The dedup check and the append happen under one write lock so two
/// scans racing on the same id can never both insert it. Readers take
/// the read lock and therefore only ever see whole records.
#[derive(Default)]
pub struct EvidenceSet {
    inner: RwLock<Inner>,
}

impl EvidenceSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `record` unless a record with the same id exists. Returns
    /// `true` when the record was added.
    pub fn insert(&self, record: EvidenceRecord) -> bool {
        let mut inner = self.inner.write().unwrap_or_else(|e| e.into_inner());
        if inner.ids.contains(&record.id) {
            return false;
        }
        inner.ids.insert(record.id.clone());
        inner.records.push(record);
        true
    }

    pub fn contains(&self, id: &str) -> bool {
        self.inner
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .ids
            .contains(id)
    }

    /// Copy of every record in insertion order
    pub fn snapshot(&self) -> Vec<EvidenceRecord> {
        self.inner
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .records
            .clone()
    }

    pub fn len(&self) -> usize {
        self.inner.read().unwrap_or_else(|e| e.into_inner()).records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl EvidenceLookup for EvidenceSet {
    fn find_match(&self, predicate: &dyn Fn(&EvidenceRecord) -> bool) -> Option<EvidenceRecord> {
        self.inner
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .records
            .iter()
            .find(|r| predicate(r))
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, snippet: &str) -> EvidenceRecord {
        EvidenceRecord {
            id: id.to_string(),
            snippet: snippet.to_string(),
            timestamp: DateTime::from_timestamp_millis(1_700_000_000_000).unwrap(),
        }
    }

    #[test]
    fn it_parses_internal_date_millis() {
        let body = MessageBody {
            snippet: "You paid via UPI".to_string(),
            internal_date: "1700000000000".to_string(),
        };
        let rec = EvidenceRecord::from_message(&MessageRef::new("m1"), body).unwrap();
        assert_eq!(rec.id, "m1");
        assert_eq!(rec.timestamp.to_rfc3339(), "2023-11-14T22:13:20+00:00");
    }

    #[test]
    fn it_rejects_non_numeric_internal_date() {
        let body = MessageBody {
            snippet: "You paid via UPI".to_string(),
            internal_date: "yesterday".to_string(),
        };
        let err = EvidenceRecord::from_message(&MessageRef::new("m1"), body).unwrap_err();
        assert!(matches!(err, PaymentError::FetchFailure { ref id, .. } if id == "m1"));
    }

    #[test]
    fn it_ignores_duplicate_ids() {
        let set = EvidenceSet::new();
        assert!(set.insert(record("m1", "paid via upi")));
        assert!(!set.insert(record("m1", "a different snippet")));
        assert_eq!(set.len(), 1);
        assert_eq!(set.snapshot()[0].snippet, "paid via upi");
    }

    #[test]
    fn it_preserves_insertion_order() {
        let set = EvidenceSet::new();
        set.insert(record("b", "x"));
        set.insert(record("a", "y"));
        set.insert(record("c", "z"));
        let ids: Vec<String> = set.snapshot().into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec!["b", "a", "c"]);
    }

    #[test]
    fn it_finds_the_first_match() {
        let set = EvidenceSet::new();
        set.insert(record("m1", "card"));
        set.insert(record("m2", "upi one"));
        set.insert(record("m3", "upi two"));
        let found = set.find_match(&|r: &EvidenceRecord| r.snippet.contains("upi")).unwrap();
        assert_eq!(found.id, "m2");
        assert!(set.find_match(&|r: &EvidenceRecord| r.snippet.contains("nope")).is_none());
    }

    #[test]
    fn it_dedups_concurrent_inserts() {
        let set = std::sync::Arc::new(EvidenceSet::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let set = set.clone();
                std::thread::spawn(move || set.insert(record("same", "paid via upi")))
            })
            .collect();
        let inserted = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|added| *added)
            .count();
        assert_eq!(inserted, 1);
        assert_eq!(set.len(), 1);
    }
}
