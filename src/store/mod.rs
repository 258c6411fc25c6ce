// Keyrack — Store Module
//
// Volatile, schema-validated credential storage. Values are validated on
// write and only leave the store masked, unless a caller explicitly asks for
// the raw record.

mod error;
mod export;
mod mask;
mod models;
mod repository;
mod validate;

pub use error::StoreError;
pub use export::export_all_masked;
pub use mask::{display_value, is_sensitive, mask_fields, MASK};
pub use models::{CredentialRecord, ExportDocument, ExportedPlatform, FieldMap, MaskedField};
pub use repository::{CredentialStore, InMemoryCredentialStore};
pub use validate::check;
