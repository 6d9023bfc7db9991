//! Read-only compliance queries over a store snapshot.

use chrono::{DateTime, Utc};

use trailguard_contracts::{error::AuditResult, record::AuditRecord};
use trailguard_core::traits::AuditStore;

/// Conjunctive filter; unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordFilter {
    pub actor_id: Option<String>,
    pub action: Option<String>,
    /// Inclusive lower bound on `timestamp`.
    pub since: Option<DateTime<Utc>>,
    /// Exclusive upper bound on `timestamp`.
    pub until: Option<DateTime<Utc>>,
}

impl RecordFilter {
    pub fn matches(&self, record: &AuditRecord) -> bool {
        if let Some(actor) = &self.actor_id {
            if record.actor_id.as_deref() != Some(actor.as_str()) {
                return false;
            }
        }
        if let Some(action) = &self.action {
            if &record.action != action {
                return false;
            }
        }
        if let Some(since) = self.since {
            if record.timestamp < since {
                return false;
            }
        }
        if let Some(until) = self.until {
            if record.timestamp >= until {
                return false;
            }
        }
        true
    }
}

/// Return the records matching `filter`, in chain order.
pub fn query(store: &dyn AuditStore, filter: &RecordFilter) -> AuditResult<Vec<AuditRecord>> {
    Ok(store
        .snapshot()?
        .into_iter()
        .filter(|r| filter.matches(r))
        .collect())
}
