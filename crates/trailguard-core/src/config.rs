//! TOML configuration for the trailguard audit trail.
//!
//! Every section is optional.  A missing file section falls back to the
//! defaults below, which describe a JSON Lines store at
//! `audit/trail.jsonl`, three compare-and-append retries, and exhaustive
//! verification.
//!
//! ```toml
//! [store]
//! kind = "file"
//! path = "audit/trail.jsonl"
//!
//! [writer]
//! max_retries = 3
//!
//! [verify]
//! mode = "exhaustive"
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use trailguard_contracts::{
    error::{AuditError, AuditResult},
    report::VerifyMode,
};

/// Which backend holds the chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StoreKind {
    /// Append-only JSON Lines file.
    #[default]
    File,
    /// Process-local, non-durable store.  Useful for tests and dry runs.
    Memory,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub kind: StoreKind,
    /// Location of the JSON Lines file.  Required when `kind = "file"`.
    pub path: Option<PathBuf>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            kind: StoreKind::File,
            path: Some(PathBuf::from("audit/trail.jsonl")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WriterConfig {
    /// How many times an append is retried after losing a compare-and-append
    /// race before giving up with `AuditError::Conflict`.
    pub max_retries: u32,
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self { max_retries: 3 }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VerifyConfig {
    pub mode: VerifyMode,
}

/// Top-level configuration document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrailConfig {
    pub store: StoreConfig,
    pub writer: WriterConfig,
    pub verify: VerifyConfig,
}

impl TrailConfig {
    /// Parse `s` as TOML and validate the result.
    ///
    /// Returns `AuditError::Config` if the TOML is malformed, does not match
    /// the `TrailConfig` schema, or fails `validate`.
    pub fn from_toml_str(s: &str) -> AuditResult<Self> {
        let config: TrailConfig = toml::from_str(s).map_err(|e| AuditError::Config {
            reason: format!("failed to parse trail config TOML: {}", e),
        })?;
        config.validate()?;
        debug!(
            store_kind = ?config.store.kind,
            max_retries = config.writer.max_retries,
            verify_mode = ?config.verify.mode,
            "trail config loaded"
        );
        Ok(config)
    }

    /// Read the file at `path` and parse it as TOML trail configuration.
    pub fn from_file(path: &Path) -> AuditResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| AuditError::Config {
            reason: format!("failed to read config file '{}': {}", path.display(), e),
        })?;
        Self::from_toml_str(&contents)
    }

    /// Reject configurations that cannot produce a working store.
    pub fn validate(&self) -> AuditResult<()> {
        if self.store.kind == StoreKind::File {
            match &self.store.path {
                Some(path) if !path.as_os_str().is_empty() => {}
                _ => {
                    return Err(AuditError::Config {
                        reason: "store.path is required when store.kind = \"file\"".to_string(),
                    })
                }
            }
        }
        Ok(())
    }
}
