// Keyrack — Display masking
//
// Sensitivity is derived from the field name alone. Masked values are a fixed
// literal so neither the length nor any character of a secret is revealed.

use std::collections::BTreeMap;

use crate::registry::PlatformSchema;

use super::models::MaskedField;

/// Display literal for sensitive values.
pub const MASK: &str = "••••••••••••";

const SENSITIVE_MARKERS: &[&str] = &["token", "secret", "password"];

/// True if the field name contains `token`, `secret` or `password`, ignoring case.
pub fn is_sensitive(field_name: &str) -> bool {
    let lowered = field_name.to_lowercase();
    SENSITIVE_MARKERS.iter().any(|m| lowered.contains(m))
}

pub fn display_value(field_name: &str, raw_value: &str) -> String {
    if is_sensitive(field_name) {
        MASK.to_string()
    } else {
        raw_value.to_string()
    }
}

/// Mask `fields` in the schema's declared order.
///
/// Declared fields absent from the map are skipped; records held by the store
/// are always complete, so this only matters for hand-built maps.
pub fn mask_fields(schema: &PlatformSchema, fields: &BTreeMap<String, String>) -> Vec<MaskedField> {
    schema
        .fields()
        .iter()
        .filter_map(|name| {
            fields
                .get(name)
                .map(|raw| MaskedField::new(name.clone(), display_value(name, raw)))
        })
        .collect()
}
