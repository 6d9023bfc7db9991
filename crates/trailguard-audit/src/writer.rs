//! The chain writer: the only path by which records enter a store.
//!
//! `append` is a read-modify-write over the chain tail:
//!
//!   read tail → build + hash the next record → compare-and-append
//!
//! The whole sequence runs under the writer's mutex, so appends issued
//! through one `ChainWriter` are strictly serialized.  The store's own
//! compare-and-append additionally rejects a write whose predecessor is no
//! longer the tail, which covers several writers sharing one store.  A
//! rejected write is rebuilt on the new tail and retried.

use std::sync::{Arc, Mutex};

use chrono::Utc;
use serde_json::Value;
use tracing::{debug, warn};

use trailguard_contracts::{
    error::{AuditError, AuditResult},
    record::AuditRecord,
};
use trailguard_core::{config::WriterConfig, traits::AuditStore};

use crate::chain::link_pending;

/// Longest accepted action tag, in characters.
pub const MAX_ACTION_LEN: usize = 128;

/// Reject action tags that are empty, too long, or carry control characters.
pub fn validate_action(action: &str) -> AuditResult<()> {
    if action.trim().is_empty() {
        return Err(AuditError::Validation {
            reason: "action must not be empty".to_string(),
        });
    }
    if action.chars().count() > MAX_ACTION_LEN {
        return Err(AuditError::Validation {
            reason: format!("action exceeds {} characters", MAX_ACTION_LEN),
        });
    }
    if action.chars().any(char::is_control) {
        return Err(AuditError::Validation {
            reason: format!("action {:?} contains control characters", action),
        });
    }
    Ok(())
}

/// Appends hash-linked records to an `AuditStore`.
pub struct ChainWriter {
    store: Arc<dyn AuditStore>,
    max_retries: u32,
    /// Serializes the tail read and the write of each append.
    append_lock: Mutex<()>,
}

impl ChainWriter {
    /// Create a writer with the default retry budget.
    pub fn new(store: Arc<dyn AuditStore>) -> Self {
        Self::from_config(store, &WriterConfig::default())
    }

    pub fn from_config(store: Arc<dyn AuditStore>, config: &WriterConfig) -> Self {
        Self {
            store,
            max_retries: config.max_retries,
            append_lock: Mutex::new(()),
        }
    }

    /// The store this writer appends to.
    pub fn store(&self) -> &Arc<dyn AuditStore> {
        &self.store
    }

    /// Append one record to the end of the chain.
    ///
    /// `timestamp` is taken from the clock here; callers cannot supply it.
    /// Call this after the audited action has completed, not before.
    ///
    /// # Errors
    ///
    /// - `Validation` if `action` is invalid; nothing is written.
    /// - `Storage` / `Serialization` if the store fails; nothing is written.
    /// - `Conflict` if the tail kept moving for more than `max_retries`
    ///   attempts.
    pub fn append(
        &self,
        action: &str,
        details: Value,
        actor_id: Option<&str>,
    ) -> AuditResult<AuditRecord> {
        validate_action(action)?;

        let _guard = self.append_lock.lock().map_err(|e| AuditError::Storage {
            reason: format!("chain writer lock poisoned: {}", e),
        })?;

        let mut attempt: u32 = 0;
        loop {
            let tail = self.store.tail()?;
            let pending = link_pending(action, details.clone(), actor_id, Utc::now(), tail.as_ref());

            match self.store.append(pending) {
                Ok(record) => {
                    debug!(
                        id = %record.id,
                        action = %record.action,
                        actor_id = record.actor_id.as_deref().unwrap_or("-"),
                        hash = %record.hash,
                        "audit record appended"
                    );
                    return Ok(record);
                }
                Err(AuditError::Conflict { expected, found }) if attempt < self.max_retries => {
                    attempt += 1;
                    warn!(
                        action = %action,
                        attempt,
                        expected = %expected,
                        found = %found,
                        "chain tail moved during append, retrying"
                    );
                }
                Err(e) => return Err(e),
            }
        }
    }
}
