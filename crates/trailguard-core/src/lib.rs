//! # trailguard-core
//!
//! The storage seam and configuration of the trailguard audit trail.
//!
//! This crate provides:
//! - The `AuditStore` trait every backend implements
//! - `TrailConfig`, the TOML configuration document
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::path::Path;
//! use trailguard_core::{config::TrailConfig, traits::AuditStore};
//!
//! let config = TrailConfig::from_file(Path::new("trailguard.toml"))?;
//! ```

pub mod config;
pub mod traits;

pub use config::TrailConfig;
pub use traits::AuditStore;

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use trailguard_contracts::{error::AuditError, report::VerifyMode};

    use crate::config::{StoreKind, TrailConfig};

    #[test]
    fn empty_document_uses_defaults() {
        let config = TrailConfig::from_toml_str("").unwrap();
        assert_eq!(config, TrailConfig::default());
        assert_eq!(config.store.kind, StoreKind::File);
        assert_eq!(config.store.path, Some(PathBuf::from("audit/trail.jsonl")));
        assert_eq!(config.writer.max_retries, 3);
        assert_eq!(config.verify.mode, VerifyMode::Exhaustive);
    }

    #[test]
    fn full_document_parses() {
        let toml = r#"
            [store]
            kind = "file"
            path = "/var/lib/trail/audit.jsonl"

            [writer]
            max_retries = 8

            [verify]
            mode = "first-failure"
        "#;

        let config = TrailConfig::from_toml_str(toml).unwrap();
        assert_eq!(
            config.store.path,
            Some(PathBuf::from("/var/lib/trail/audit.jsonl"))
        );
        assert_eq!(config.writer.max_retries, 8);
        assert_eq!(config.verify.mode, VerifyMode::FirstFailure);
    }

    #[test]
    fn memory_store_needs_no_path() {
        let toml = r#"
            [store]
            kind = "memory"
            path = ""
        "#;
        let config = TrailConfig::from_toml_str(toml).unwrap();
        assert_eq!(config.store.kind, StoreKind::Memory);
    }

    #[test]
    fn file_store_without_path_is_rejected() {
        let toml = r#"
            [store]
            kind = "file"
            path = ""
        "#;
        match TrailConfig::from_toml_str(toml) {
            Err(AuditError::Config { reason }) => {
                assert!(reason.contains("store.path"), "unexpected reason: {reason}");
            }
            other => panic!("expected Config error, got {:?}", other),
        }
    }

    #[test]
    fn unknown_verify_mode_is_rejected() {
        let toml = r#"
            [verify]
            mode = "sometimes"
        "#;
        assert!(matches!(
            TrailConfig::from_toml_str(toml),
            Err(AuditError::Config { .. })
        ));
    }

    #[test]
    fn missing_file_is_a_config_error() {
        let err = TrailConfig::from_file(std::path::Path::new("/nonexistent/trailguard.toml"))
            .unwrap_err();
        assert!(err.to_string().contains("failed to read config file"));
    }
}
