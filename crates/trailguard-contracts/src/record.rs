//! Audit record types.
//!
//! `AuditRecord` is the unit of the hash chain.  `PendingRecord` is the same
//! record before the store has assigned it an identifier; the writer builds
//! one, the store persists it and hands back the full `AuditRecord`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Opaque store-assigned identifier of a persisted record.
///
/// Not part of the hashed payload, so re-keying a record in the store does not
/// by itself break the chain.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub String);

impl RecordId {
    /// Create a new, unique record ID.
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

impl Default for RecordId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single entry in the audit hash chain.
///
/// Every field except `id` feeds the record's `hash`.  Changing any of them
/// after the fact makes the stored `hash` unreproducible, and changing `hash`
/// itself breaks the `prev_hash` link of the following record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditRecord {
    /// Store-assigned identifier.
    pub id: RecordId,

    /// Event category, e.g. `"EARN_CREDITS"` or `"PERIOD_LOG_CREATED"`.
    pub action: String,

    /// Structured description of the event.  Hashed in canonical form.
    pub details: Value,

    /// The acting principal, absent for anonymous or system actions.
    pub actor_id: Option<String>,

    /// Wall-clock time (UTC) the record was appended.
    pub timestamp: DateTime<Utc>,

    /// SHA-256 (lowercase hex) of this record's fields and `prev_hash`.
    pub hash: String,

    /// `hash` of the record appended immediately before this one, or `None`
    /// for the first record in the chain.
    pub prev_hash: Option<String>,
}

/// A fully hashed record that has not been persisted yet.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingRecord {
    pub action: String,
    pub details: Value,
    pub actor_id: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub hash: String,
    pub prev_hash: Option<String>,
}

impl PendingRecord {
    /// Attach the store-assigned `id`, producing the persisted form.
    pub fn into_record(self, id: RecordId) -> AuditRecord {
        AuditRecord {
            id,
            action: self.action,
            details: self.details,
            actor_id: self.actor_id,
            timestamp: self.timestamp,
            hash: self.hash,
            prev_hash: self.prev_hash,
        }
    }
}
