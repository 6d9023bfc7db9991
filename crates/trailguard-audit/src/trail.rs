//! Best-effort audit recording for request handlers.
//!
//! By the time a handler records an audit entry its own operation has
//! already committed.  A failed append must not undo or block that
//! operation, and it must not be reported through the audit log that just
//! failed.  `AuditTrail::record` therefore swallows the error after emitting
//! it on the `trailguard::audit_failure` tracing target and counting it.

use std::sync::atomic::{AtomicU64, Ordering};

use serde_json::Value;
use tracing::error;

use trailguard_contracts::record::AuditRecord;

use crate::writer::ChainWriter;

/// Tracing target for dropped audit entries.  Route it to an alerting sink.
pub const AUDIT_FAILURE_TARGET: &str = "trailguard::audit_failure";

pub struct AuditTrail {
    writer: ChainWriter,
    failed: AtomicU64,
}

impl AuditTrail {
    pub fn new(writer: ChainWriter) -> Self {
        Self {
            writer,
            failed: AtomicU64::new(0),
        }
    }

    /// Record that `action` happened.  Returns the stored record, or `None`
    /// if the entry could not be written.
    pub fn record(
        &self,
        action: &str,
        details: Value,
        actor_id: Option<&str>,
    ) -> Option<AuditRecord> {
        match self.writer.append(action, details, actor_id) {
            Ok(record) => Some(record),
            Err(e) => {
                let failed = self.failed.fetch_add(1, Ordering::Relaxed) + 1;
                error!(
                    target: AUDIT_FAILURE_TARGET,
                    action = %action,
                    actor_id = actor_id.unwrap_or("-"),
                    failed_total = failed,
                    error = %e,
                    "audit entry dropped"
                );
                None
            }
        }
    }

    /// Number of entries dropped since this trail was created.
    pub fn failed_appends(&self) -> u64 {
        self.failed.load(Ordering::Relaxed)
    }

    pub fn writer(&self) -> &ChainWriter {
        &self.writer
    }
}
