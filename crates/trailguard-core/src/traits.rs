//! Core trait definitions for the trailguard audit trail.
//!
//! `AuditStore` is the only seam between the chain logic and persistence.
//! The writer (`trailguard-audit`) and the verifier (`trailguard-verify`)
//! both work purely in terms of this trait.

use trailguard_contracts::{
    error::AuditResult,
    record::{AuditRecord, PendingRecord},
};

/// Durable, insertion-ordered storage for audit records.
///
/// Implementations are **trusted** and must never reorder, update, or delete
/// records.  There is deliberately no method to do so.
pub trait AuditStore: Send + Sync {
    /// Return the most recently appended record, or `None` for an empty chain.
    fn tail(&self) -> AuditResult<Option<AuditRecord>>;

    /// Atomically append `record` if, and only if, the current tail's hash
    /// equals `record.prev_hash` (or the store is empty and `prev_hash` is
    /// `None`).
    ///
    /// On success the store assigns the record's `id` and returns the
    /// persisted form.  If another append moved the tail first, returns
    /// `AuditError::Conflict` and writes nothing.
    fn append(&self, record: PendingRecord) -> AuditResult<AuditRecord>;

    /// Return every record in insertion order.
    ///
    /// The returned vector is a consistent point-in-time copy: appends that
    /// race with this call are either fully included or fully excluded.
    fn snapshot(&self) -> AuditResult<Vec<AuditRecord>>;

    /// Number of records currently stored.
    fn len(&self) -> AuditResult<usize>;

    fn is_empty(&self) -> AuditResult<bool> {
        Ok(self.len()? == 0)
    }
}

/// Shared implementation for the common case of an `Arc`'d store handed to
/// both a writer and a verifier.
impl<S: AuditStore + ?Sized> AuditStore for std::sync::Arc<S> {
    fn tail(&self) -> AuditResult<Option<AuditRecord>> {
        (**self).tail()
    }

    fn append(&self, record: PendingRecord) -> AuditResult<AuditRecord> {
        (**self).append(record)
    }

    fn snapshot(&self) -> AuditResult<Vec<AuditRecord>> {
        (**self).snapshot()
    }

    fn len(&self) -> AuditResult<usize> {
        (**self).len()
    }
}
