//! # trailguard-verify
//!
//! Offline integrity verification for the trailguard audit trail.
//!
//! This crate provides [`engine::ChainVerifier`], which reads a snapshot of
//! an [`AuditStore`](trailguard_core::traits::AuditStore) and reports every
//! point where the chain no longer holds:
//!
//! 1. **Hash**: a record's stored hash is not reproducible from its fields.
//! 2. **Link**: a record's `prev_hash` does not name its predecessor.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use trailguard_contracts::report::VerifyMode;
//! use trailguard_verify::ChainVerifier;
//!
//! let verifier = ChainVerifier::new(store, VerifyMode::Exhaustive);
//! match verifier.verify()? {
//!     VerificationResult::Intact { .. } => println!("intact"),
//!     VerificationResult::Tampered { findings, .. } => {
//!         for f in findings {
//!             eprintln!("{f}");
//!         }
//!     }
//! }
//! ```

pub mod engine;

pub use engine::{verify_records, verify_records_from, ChainVerifier};

// ── Tests ─────────────────────────────────────────────────────────────────────
