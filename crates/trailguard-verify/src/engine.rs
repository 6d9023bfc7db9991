//! Hash-chain verifier for the trailguard audit trail.
//!
//! `ChainVerifier` takes a point-in-time snapshot of a store and scans it
//! once, in insertion order.  For every record it checks:
//!
//! 1. **Link**: `prev_hash` equals the stored `hash` of the record before
//!    it (or is absent for the first record).  Catches deletion,
//!    reordering, and forged insertion.
//! 2. **Hash**: the stored `hash` equals the hash recomputed from the
//!    record's own fields.  Catches in-place edits.
//!
//! In `Exhaustive` mode every finding is collected so operators see the full
//! extent of tampering in one pass; `FirstFailure` halts at the first one.
//! A finding is a terminal result, never retried.  The verifier never writes
//! to the store.

use std::sync::Arc;

use tracing::{debug, info, warn};

use trailguard_audit::chain::hash_record;
use trailguard_contracts::{
    error::AuditResult,
    record::AuditRecord,
    report::{Checkpoint, TamperFinding, TamperReason, VerificationResult, VerifyMode},
};
use trailguard_core::traits::AuditStore;

/// Read-only integrity checker over an `AuditStore`.
pub struct ChainVerifier {
    store: Arc<dyn AuditStore>,
    mode: VerifyMode,
}

impl ChainVerifier {
    pub fn new(store: Arc<dyn AuditStore>, mode: VerifyMode) -> Self {
        Self { store, mode }
    }

    pub fn mode(&self) -> VerifyMode {
        self.mode
    }

    /// Verify the whole chain.
    ///
    /// Returns `Err` only when the store cannot be read.  Tampering is
    /// reported as `Ok(VerificationResult::Tampered { .. })`.
    pub fn verify(&self) -> AuditResult<VerificationResult> {
        let records = self.store.snapshot()?;
        Ok(verify_records(&records, self.mode))
    }

    /// Verify only the records appended after `checkpoint`.
    ///
    /// The record the checkpoint ends on must still carry the checkpointed
    /// hash; everything up to it is trusted without recomputation.
    pub fn verify_from(&self, checkpoint: &Checkpoint) -> AuditResult<VerificationResult> {
        let records = self.store.snapshot()?;
        Ok(verify_records_from(&records, checkpoint, self.mode))
    }
}

/// Verify an in-memory slice of records, e.g. one loaded from an export.
pub fn verify_records(records: &[AuditRecord], mode: VerifyMode) -> VerificationResult {
    scan(records, 0, mode)
}

/// Verify the suffix of `records` that follows `checkpoint`.
pub fn verify_records_from(
    records: &[AuditRecord],
    checkpoint: &Checkpoint,
    mode: VerifyMode,
) -> VerificationResult {
    if checkpoint.records == 0 {
        return scan(records, 0, mode);
    }

    if checkpoint.records > records.len() {
        let finding = TamperFinding {
            position: checkpoint.records,
            record_id: None,
            action: None,
            reason: TamperReason::CheckpointBeyondEnd {
                checkpoint_records: checkpoint.records,
                records: records.len(),
            },
        };
        return report_findings(0, vec![finding]);
    }

    let anchor = &records[checkpoint.records - 1];
    if checkpoint.terminal_hash.as_deref() != Some(anchor.hash.as_str()) {
        let finding = TamperFinding {
            position: checkpoint.records,
            record_id: Some(anchor.id.clone()),
            action: Some(anchor.action.clone()),
            reason: TamperReason::CheckpointMismatch {
                expected: checkpoint.terminal_hash.clone().unwrap_or_default(),
                found: anchor.hash.clone(),
            },
        };
        return report_findings(0, vec![finding]);
    }

    scan(records, checkpoint.records, mode)
}

/// Check `records[start..]`, trusting `records[start - 1]` as the anchor.
fn scan(records: &[AuditRecord], start: usize, mode: VerifyMode) -> VerificationResult {
    let mut findings: Vec<TamperFinding> = Vec::new();
    let mut checked = 0usize;

    debug!(records = records.len(), start, ?mode, "verification starting");

    for (idx, record) in records.iter().enumerate().skip(start) {
        checked += 1;

        let link = match idx.checked_sub(1).map(|p| &records[p]) {
            None => record
                .prev_hash
                .as_ref()
                .map(|found| TamperReason::UnexpectedPredecessor {
                    found: found.clone(),
                }),
            Some(prev) if record.prev_hash.as_deref() != Some(prev.hash.as_str()) => {
                Some(TamperReason::BrokenLink {
                    expected: Some(prev.hash.clone()),
                    found: record.prev_hash.clone(),
                })
            }
            Some(_) => None,
        };
        if let Some(reason) = link {
            findings.push(finding_at(idx, record, reason));
            if mode == VerifyMode::FirstFailure {
                break;
            }
        }

        let recomputed = hash_record(record);
        if recomputed != record.hash {
            findings.push(finding_at(
                idx,
                record,
                TamperReason::HashMismatch {
                    stored: record.hash.clone(),
                    recomputed,
                },
            ));
            if mode == VerifyMode::FirstFailure {
                break;
            }
        }
    }

    if findings.is_empty() {
        let checkpoint = Checkpoint {
            records: records.len(),
            terminal_hash: records.last().map(|r| r.hash.clone()),
        };
        info!(
            records_checked = checked,
            terminal_hash = checkpoint.terminal_hash.as_deref().unwrap_or("<empty>"),
            "audit chain intact"
        );
        VerificationResult::Intact {
            records_checked: checked,
            checkpoint,
        }
    } else {
        report_findings(checked, findings)
    }
}

fn finding_at(idx: usize, record: &AuditRecord, reason: TamperReason) -> TamperFinding {
    TamperFinding {
        position: idx + 1,
        record_id: Some(record.id.clone()),
        action: Some(record.action.clone()),
        reason,
    }
}

fn report_findings(checked: usize, findings: Vec<TamperFinding>) -> VerificationResult {
    for finding in &findings {
        warn!(
            position = finding.position,
            action = finding.action.as_deref().unwrap_or("-"),
            reason = %finding.reason,
            "audit chain tampering detected"
        );
    }
    VerificationResult::Tampered {
        records_checked: checked,
        findings,
    }
}
