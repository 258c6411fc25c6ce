// Keyrack — Credential Store Repository
//
// In-memory, schema-validated credential records. Writers hold the exclusive
// lock across schema lookup, validation and replacement, so readers only ever
// observe complete records.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::registry::PlatformSchemaRegistry;

use super::mask;
use super::models::{CredentialRecord, FieldMap, MaskedField};
use super::validate;
use super::StoreError;

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over credential storage operations.
pub trait CredentialStore {
    /// The schema catalog this store validates against.
    fn registry(&self) -> &PlatformSchemaRegistry;

    /// Validate `fields` and replace the platform's record. On error the store
    /// is left untouched.
    fn upsert(&self, platform_id: &str, fields: &FieldMap) -> Result<(), StoreError>;

    /// Get a platform's record, WITH raw values.
    fn get(&self, platform_id: &str) -> Option<CredentialRecord>;

    /// Delete a platform's record. Returns true if it existed.
    fn remove(&self, platform_id: &str) -> bool;

    /// Platform ids currently holding a record, sorted.
    fn list_configured(&self) -> BTreeSet<String>;

    /// Masked fields of a platform's record, in schema order.
    fn masked_view(&self, platform_id: &str) -> Result<Vec<MaskedField>, StoreError>;

    /// Consistent copy of every record, taken in one read.
    fn snapshot(&self) -> BTreeMap<String, CredentialRecord>;

    /// Drop every record.
    fn reset(&self);
}

// ─── In-Memory Implementation ───────────────────────────────────────────────

pub struct InMemoryCredentialStore {
    registry: Arc<PlatformSchemaRegistry>,
    records: RwLock<HashMap<String, CredentialRecord>>,
}

impl InMemoryCredentialStore {
    pub fn new(registry: Arc<PlatformSchemaRegistry>) -> Self {
        Self {
            registry,
            records: RwLock::new(HashMap::new()),
        }
    }

    /// A store backed by the built-in platform catalog.
    pub fn with_builtin_catalog() -> Self {
        Self::new(Arc::new(PlatformSchemaRegistry::builtin()))
    }
}

impl Default for InMemoryCredentialStore {
    fn default() -> Self {
        Self::with_builtin_catalog()
    }
}

impl CredentialStore for InMemoryCredentialStore {
    fn registry(&self) -> &PlatformSchemaRegistry {
        &self.registry
    }

    fn upsert(&self, platform_id: &str, fields: &FieldMap) -> Result<(), StoreError> {
        let mut records = self.records.write();

        let schema = self.registry.get(platform_id)?;
        let normalized = validate::check(schema, fields)?;

        records.insert(
            platform_id.to_string(),
            CredentialRecord::new(platform_id.to_string(), normalized),
        );
        Ok(())
    }

    fn get(&self, platform_id: &str) -> Option<CredentialRecord> {
        self.records.read().get(platform_id).cloned()
    }

    fn remove(&self, platform_id: &str) -> bool {
        self.records.write().remove(platform_id).is_some()
    }

    fn list_configured(&self) -> BTreeSet<String> {
        self.records.read().keys().cloned().collect()
    }

    fn masked_view(&self, platform_id: &str) -> Result<Vec<MaskedField>, StoreError> {
        let schema = self.registry.get(platform_id)?;
        let record = self
            .get(platform_id)
            .ok_or_else(|| StoreError::NotConfigured(platform_id.to_string()))?;

        Ok(mask::mask_fields(schema, record.fields()))
    }

    fn snapshot(&self) -> BTreeMap<String, CredentialRecord> {
        self.records
            .read()
            .iter()
            .map(|(id, record)| (id.clone(), record.clone()))
            .collect()
    }

    fn reset(&self) {
        self.records.write().clear();
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
