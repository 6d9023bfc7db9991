//! In-memory implementation of `AuditStore`.
//!
//! `InMemoryAuditStore` keeps all records in a `Vec` protected by a `Mutex`,
//! making it safe to share across threads while several writers append.
//! It is not durable; use it for tests, dry runs, and for verifying records
//! loaded from an export.

use std::sync::{Arc, Mutex, MutexGuard};

use trailguard_contracts::{
    error::{AuditError, AuditResult},
    record::{AuditRecord, PendingRecord, RecordId},
};
use trailguard_core::traits::AuditStore;

/// The mutable interior of an `InMemoryAuditStore`.
pub(crate) struct InMemoryState {
    /// All records, in append order.
    pub(crate) records: Vec<AuditRecord>,
}

/// A process-local, append-only audit store.
#[derive(Clone)]
pub struct InMemoryAuditStore {
    pub(crate) state: Arc<Mutex<InMemoryState>>,
}

impl InMemoryAuditStore {
    pub fn new() -> Self {
        Self::from_records(Vec::new())
    }

    /// Wrap records obtained elsewhere (an export, a backup, a copy of a
    /// production table) so they can be verified or queried.
    ///
    /// The records are taken as-is.  Nothing here checks their hashes; that
    /// is the verifier's job.
    pub fn from_records(records: Vec<AuditRecord>) -> Self {
        Self {
            state: Arc::new(Mutex::new(InMemoryState { records })),
        }
    }

    fn lock(&self) -> AuditResult<MutexGuard<'_, InMemoryState>> {
        self.state.lock().map_err(|e| AuditError::Storage {
            reason: format!("audit store lock poisoned: {}", e),
        })
    }
}

impl Default for InMemoryAuditStore {
    fn default() -> Self {
        Self::new()
    }
}

impl AuditStore for InMemoryAuditStore {
    fn tail(&self) -> AuditResult<Option<AuditRecord>> {
        Ok(self.lock()?.records.last().cloned())
    }

    fn append(&self, record: PendingRecord) -> AuditResult<AuditRecord> {
        let mut state = self.lock()?;

        let tail_hash = state.records.last().map(|r| r.hash.as_str());
        if tail_hash != record.prev_hash.as_deref() {
            return Err(AuditError::conflict(record.prev_hash.as_deref(), tail_hash));
        }

        let stored = record.into_record(RecordId::new());
        state.records.push(stored.clone());
        Ok(stored)
    }

    fn snapshot(&self) -> AuditResult<Vec<AuditRecord>> {
        Ok(self.lock()?.records.clone())
    }

    fn len(&self) -> AuditResult<usize> {
        Ok(self.lock()?.records.len())
    }
}
