//! Store construction from configuration.

use std::sync::Arc;

use trailguard_contracts::error::{AuditError, AuditResult};
use trailguard_core::{
    config::{StoreConfig, StoreKind},
    traits::AuditStore,
};

use crate::{file::JsonlAuditStore, memory::InMemoryAuditStore};

/// Open the store described by `config`.
pub fn open_store(config: &StoreConfig) -> AuditResult<Arc<dyn AuditStore>> {
    match config.kind {
        StoreKind::Memory => Ok(Arc::new(InMemoryAuditStore::new())),
        StoreKind::File => {
            let path = config.path.as_ref().ok_or_else(|| AuditError::Config {
                reason: "store.path is required when store.kind = \"file\"".to_string(),
            })?;
            Ok(Arc::new(JsonlAuditStore::open(path)?))
        }
    }
}
