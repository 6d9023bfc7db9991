//! Verification result and finding types.
//!
//! The verifier never fails because of tampering.  Tampering is a finding,
//! returned as `VerificationResult::Tampered` with one `TamperFinding` per
//! break it observed.

use serde::{Deserialize, Serialize};

use crate::record::RecordId;

/// How far a verification pass goes after the first break.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VerifyMode {
    /// Stop at the first finding.
    FirstFailure,
    /// Scan the whole chain and report every finding.
    #[default]
    Exhaustive,
}

/// Why a record failed verification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TamperReason {
    /// The record's stored hash does not match the hash recomputed from its
    /// own fields: the record was edited in place.
    HashMismatch { stored: String, recomputed: String },

    /// The record's `prev_hash` does not match the stored hash of the record
    /// before it: something was deleted, reordered, or forged in between.
    BrokenLink {
        expected: Option<String>,
        found: Option<String>,
    },

    /// The first record of the chain claims a predecessor.
    UnexpectedPredecessor { found: String },

    /// The record a checkpoint anchors on no longer carries the checkpointed
    /// hash.
    CheckpointMismatch { expected: String, found: String },

    /// The chain is shorter than the checkpoint it is verified against.
    CheckpointBeyondEnd { checkpoint_records: usize, records: usize },
}

impl std::fmt::Display for TamperReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::HashMismatch { stored, recomputed } => write!(
                f,
                "stored hash {stored} does not match recomputed hash {recomputed}"
            ),
            Self::BrokenLink { expected, found } => write!(
                f,
                "prev_hash {} does not link to preceding record hash {}",
                found.as_deref().unwrap_or("<none>"),
                expected.as_deref().unwrap_or("<none>")
            ),
            Self::UnexpectedPredecessor { found } => {
                write!(f, "first record claims predecessor {found}")
            }
            Self::CheckpointMismatch { expected, found } => write!(
                f,
                "checkpoint hash {expected} does not match stored hash {found}"
            ),
            Self::CheckpointBeyondEnd {
                checkpoint_records,
                records,
            } => write!(
                f,
                "checkpoint covers {checkpoint_records} records but the chain holds only {records}"
            ),
        }
    }
}

/// One break in the chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TamperFinding {
    /// 1-based position of the offending record in insertion order.
    pub position: usize,

    /// Store identifier of the offending record, when one exists at that
    /// position.
    pub record_id: Option<RecordId>,

    /// The offending record's action tag, as stored.
    pub action: Option<String>,

    pub reason: TamperReason,
}

impl std::fmt::Display for TamperFinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "record #{}", self.position)?;
        if let Some(action) = &self.action {
            write!(f, " (action: {action})")?;
        }
        write!(f, ": {}", self.reason)
    }
}

/// Compact commitment to a verified prefix of the chain.
///
/// `records` is the number of records that were verified; `terminal_hash` is
/// the stored hash of the last of them (`None` for an empty chain).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Checkpoint {
    pub records: usize,
    pub terminal_hash: Option<String>,
}

/// The outcome of a verification pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum VerificationResult {
    /// Every checked record reproduced its hash and linked to its predecessor.
    Intact {
        records_checked: usize,
        /// Checkpoint covering the whole verified chain.
        checkpoint: Checkpoint,
    },

    /// At least one break was found.  `findings` is in chain order and never
    /// empty.
    Tampered {
        records_checked: usize,
        findings: Vec<TamperFinding>,
    },
}

impl VerificationResult {
    pub fn is_intact(&self) -> bool {
        matches!(self, Self::Intact { .. })
    }

    /// The earliest break, if any.
    pub fn first_finding(&self) -> Option<&TamperFinding> {
        match self {
            Self::Intact { .. } => None,
            Self::Tampered { findings, .. } => findings.first(),
        }
    }

    pub fn findings(&self) -> &[TamperFinding] {
        match self {
            Self::Intact { .. } => &[],
            Self::Tampered { findings, .. } => findings,
        }
    }

    pub fn records_checked(&self) -> usize {
        match self {
            Self::Intact {
                records_checked, ..
            }
            | Self::Tampered {
                records_checked, ..
            } => *records_checked,
        }
    }
}
