//! # trailguard-audit
//!
//! Immutable, append-only, SHA-256 hash-chained audit trail.
//!
//! ## Overview
//!
//! Every record links to the previous record via its SHA-256 hash.  Editing
//! any stored record, even a single byte of its details, makes its hash
//! unreproducible and breaks the link held by its successor; the verifier in
//! `trailguard-verify` detects both.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use serde_json::json;
//! use trailguard_audit::{AuditTrail, ChainWriter, JsonlAuditStore};
//!
//! let store = Arc::new(JsonlAuditStore::open("audit/trail.jsonl")?);
//! let trail = AuditTrail::new(ChainWriter::new(store));
//!
//! // After the business operation has committed:
//! trail.record("EARN_CREDITS", json!({ "amount": 10 }), Some("user-42"));
//! ```

pub mod backend;
pub mod canonical;
pub mod chain;
pub mod file;
pub mod memory;
pub mod query;
pub mod trail;
pub mod writer;

pub use backend::open_store;
pub use canonical::canonical_json;
pub use chain::{hash_fields, hash_record};
pub use file::JsonlAuditStore;
pub use memory::InMemoryAuditStore;
pub use query::{query, RecordFilter};
pub use trail::AuditTrail;
pub use writer::ChainWriter;

// ── Tests ─────────────────────────────────────────────────────────────────────
