// Keyrack — Masked export
//
// Produces the document collaborators serialize for display or for writing
// to disk. Built from a single store snapshot; ordering is by platform id.

use super::mask;
use super::models::{ExportDocument, ExportedPlatform};
use super::repository::CredentialStore;

/// Masked snapshot of every configured platform.
pub fn export_all_masked<S>(store: &S) -> ExportDocument
where
    S: CredentialStore + ?Sized,
{
    let registry = store.registry();
    let platforms = store
        .snapshot()
        .into_iter()
        .filter_map(|(id, record)| {
            // Records are only ever stored for ids the registry knows.
            let schema = registry.get(&id).ok()?;
            let entry = ExportedPlatform {
                display_name: schema.display_name().to_string(),
                fields: mask::mask_fields(schema, record.fields()),
            };
            Some((id, entry))
        })
        .collect();

    ExportDocument { platforms }
}
