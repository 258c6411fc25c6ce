// Keyrack — Built-in platform catalog
//
// The catalog is assembled once at startup and never mutated afterwards, so
// it can be shared behind an `Arc` without locking.

use std::collections::HashSet;

use crate::store::StoreError;

use super::PlatformSchema;

/// Supported platforms, in listing order: (id, display name, required fields).
const BUILTIN_CATALOG: &[(&str, &str, &[&str])] = &[
    ("telegram", "Telegram", &["bot_token", "chat_id"]),
    ("discord", "Discord", &["bot_token", "guild_id"]),
    ("slack", "Slack", &["bot_token", "signing_secret"]),
    (
        "twitter",
        "Twitter / X",
        &["api_key", "api_secret", "access_token", "access_token_secret"],
    ),
    ("instagram", "Instagram", &["username", "password"]),
    (
        "reddit",
        "Reddit",
        &["client_id", "client_secret", "username", "password"],
    ),
];

/// Read-only catalog of platform schemas.
#[derive(Debug, Clone)]
pub struct PlatformSchemaRegistry {
    schemas: Vec<PlatformSchema>,
}

impl PlatformSchemaRegistry {
    /// The catalog of platforms Keyrack ships with.
    pub fn builtin() -> Self {
        let schemas = BUILTIN_CATALOG
            .iter()
            .map(|(id, name, fields)| PlatformSchema::from_static(id, name, fields))
            .collect();
        Self { schemas }
    }

    /// Build a registry from custom schemas. Platform ids must be unique.
    pub fn from_schemas(schemas: Vec<PlatformSchema>) -> Result<Self, StoreError> {
        let mut ids = HashSet::new();
        for schema in &schemas {
            if !ids.insert(schema.id()) {
                return Err(StoreError::InvalidSchema(format!(
                    "platform '{}' is declared twice",
                    schema.id()
                )));
            }
        }
        Ok(Self { schemas })
    }

    /// All schemas in catalog order.
    pub fn list(&self) -> &[PlatformSchema] {
        &self.schemas
    }

    /// Look up a schema by platform id.
    pub fn get(&self, platform_id: &str) -> Result<&PlatformSchema, StoreError> {
        self.schemas
            .iter()
            .find(|s| s.id() == platform_id)
            .ok_or_else(|| StoreError::UnknownPlatform(platform_id.to_string()))
    }

    pub fn contains(&self, platform_id: &str) -> bool {
        self.schemas.iter().any(|s| s.id() == platform_id)
    }
}

impl Default for PlatformSchemaRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
