// Keyrack — Credential completeness check
//
// Validation is driven by the schema's declared fields only. Undeclared keys
// in the submitted map are dropped, never stored.

use std::collections::{BTreeMap, HashMap};

use crate::registry::PlatformSchema;

use super::StoreError;

/// Check `fields` against `schema`.
///
/// Returns the declared fields with trimmed values, or
/// `IncompleteCredentials` naming every missing or blank field in schema order.
pub fn check<S>(
    schema: &PlatformSchema,
    fields: &HashMap<String, String, S>,
) -> Result<BTreeMap<String, String>, StoreError>
where
    S: std::hash::BuildHasher,
{
    let mut normalized = BTreeMap::new();
    let mut missing = Vec::new();

    for name in schema.fields() {
        match fields.get(name).map(|v| v.trim()) {
            Some(value) if !value.is_empty() => {
                normalized.insert(name.clone(), value.to_string());
            }
            _ => missing.push(name.clone()),
        }
    }

    if missing.is_empty() {
        Ok(normalized)
    } else {
        Err(StoreError::IncompleteCredentials(missing))
    }
}
