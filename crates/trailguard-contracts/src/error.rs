//! Error types for the trailguard audit trail.
//!
//! All fallible operations return `AuditResult<T>`.  Tampering is not an
//! error: the verifier reports it as a `VerificationResult::Tampered` value.

use thiserror::Error;

/// The unified error type for trailguard.
#[derive(Debug, Error)]
pub enum AuditError {
    /// The caller supplied an invalid entry (e.g. an empty action).
    ///
    /// Nothing is appended when this is returned.
    #[error("invalid audit entry: {reason}")]
    Validation { reason: String },

    /// The store could not be read or the write did not happen.
    #[error("audit storage error: {reason}")]
    Storage { reason: String },

    /// A compare-and-append lost the race: the chain tail moved between the
    /// writer's read and its write.
    #[error("audit chain conflict: expected tail {expected}, found {found}")]
    Conflict { expected: String, found: String },

    /// A record could not be encoded to, or decoded from, its stored form.
    #[error("audit serialization error: {reason}")]
    Serialization { reason: String },

    /// A required configuration value is missing or invalid.
    #[error("configuration error: {reason}")]
    Config { reason: String },
}

impl AuditError {
    /// Build a `Conflict` from two optional tail hashes, rendering an absent
    /// tail as `<empty>`.
    pub fn conflict(expected: Option<&str>, found: Option<&str>) -> Self {
        Self::Conflict {
            expected: expected.unwrap_or("<empty>").to_string(),
            found: found.unwrap_or("<empty>").to_string(),
        }
    }
}

/// Convenience alias used throughout the trailguard crates.
pub type AuditResult<T> = Result<T, AuditError>;
