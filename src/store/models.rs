// Keyrack — Credential data models
//
// SECURITY: record values are never included in Debug output when the field
// is sensitive, and every value is zeroized when the record is dropped.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

use super::mask::{is_sensitive, MASK};

/// Raw field values as submitted by a collaborator (form, prompt, socket).
pub type FieldMap = HashMap<String, String>;

/// A schema-complete set of field values for one platform.
///
/// Only the store constructs records, and only from a validated field map.
#[derive(Clone, PartialEq, Eq)]
pub struct CredentialRecord {
    platform_id: String,
    fields: BTreeMap<String, String>,
}

impl CredentialRecord {
    pub(crate) fn new(platform_id: String, fields: BTreeMap<String, String>) -> Self {
        Self {
            platform_id,
            fields,
        }
    }

    pub fn platform_id(&self) -> &str {
        &self.platform_id
    }

    /// Raw value of a field. Callers must not log or display the result.
    pub fn value(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    pub(crate) fn fields(&self) -> &BTreeMap<String, String> {
        &self.fields
    }
}

/// Custom Debug implementation that NEVER reveals a sensitive value.
impl fmt::Debug for CredentialRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let shown: BTreeMap<&str, &str> = self
            .fields
            .iter()
            .map(|(name, value)| {
                let value = if is_sensitive(name) { MASK } else { value.as_str() };
                (name.as_str(), value)
            })
            .collect();

        f.debug_struct("CredentialRecord")
            .field("platform_id", &self.platform_id)
            .field("fields", &shown)
            .finish()
    }
}

impl Drop for CredentialRecord {
    fn drop(&mut self) {
        for value in self.fields.values_mut() {
            value.zeroize();
        }
    }
}

/// One entry of a masked view: the field name and its display value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaskedField {
    pub field: String,
    pub value: String,
}

impl MaskedField {
    pub fn new(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }
}

/// A platform's entry in the export document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportedPlatform {
    pub display_name: String,
    pub fields: Vec<MaskedField>,
}

/// Fully masked snapshot of the store, keyed (and ordered) by platform id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportDocument {
    pub platforms: BTreeMap<String, ExportedPlatform>,
}

// ─── Tests ───────────────────────────────────────────────────────────────────
