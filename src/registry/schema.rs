// Keyrack — Platform schema model

use std::collections::HashSet;

use serde::Serialize;

use crate::store::StoreError;

/// Declared shape of one platform's credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlatformSchema {
    id: String,
    display_name: String,
    fields: Vec<String>,
}

impl PlatformSchema {
    /// Build a schema, checking that the id is non-blank and that the field
    /// list is non-empty with unique, non-blank names.
    pub fn new(
        id: impl Into<String>,
        display_name: impl Into<String>,
        fields: Vec<String>,
    ) -> Result<Self, StoreError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(StoreError::InvalidSchema(
                "platform id must not be empty".to_string(),
            ));
        }
        if fields.is_empty() {
            return Err(StoreError::InvalidSchema(format!(
                "platform '{}' declares no fields",
                id
            )));
        }

        let mut seen = HashSet::new();
        for field in &fields {
            if field.trim().is_empty() {
                return Err(StoreError::InvalidSchema(format!(
                    "platform '{}' declares a blank field name",
                    id
                )));
            }
            if !seen.insert(field.as_str()) {
                return Err(StoreError::InvalidSchema(format!(
                    "platform '{}' declares field '{}' twice",
                    id, field
                )));
            }
        }

        Ok(Self {
            id,
            display_name: display_name.into(),
            fields,
        })
    }

    /// Constructor for catalog entries already known to be well-formed.
    pub(super) fn from_static(id: &str, display_name: &str, fields: &[&str]) -> Self {
        Self {
            id: id.to_string(),
            display_name: display_name.to_string(),
            fields: fields.iter().map(|f| f.to_string()).collect(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Field names in declared order.
    pub fn fields(&self) -> &[String] {
        &self.fields
    }
}
