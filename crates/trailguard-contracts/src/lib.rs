//! # trailguard-contracts
//!
//! Shared types and error definitions for the trailguard audit trail.
//!
//! All crates in the workspace import from here. No business logic lives in
//! this crate, only data definitions and error types.

pub mod error;
pub mod record;
pub mod report;
