// Keyrack — Export document validation
//
// Checks a masked export written by `keyrack setup`: every entry must belong
// to a known platform, carry exactly the schema's fields, and keep every
// sensitive value masked.

use std::path::Path;

use crate::error::KeyrackError;
use crate::registry::PlatformSchemaRegistry;
use crate::store::{is_sensitive, ExportDocument, MASK};

/// Outcome of validating an export document.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct CheckReport {
    /// Platform ids whose entries passed every check.
    pub configured: Vec<String>,
    /// Failures; any entry here makes the document invalid.
    pub problems: Vec<String>,
    /// Observations that do not invalidate the document.
    pub warnings: Vec<String>,
}

impl CheckReport {
    pub fn is_valid(&self) -> bool {
        self.problems.is_empty()
    }
}

/// Read and validate the export at `path`.
///
/// A missing or unparseable file is an error, not a report.
pub fn check_export(
    path: &Path,
    registry: &PlatformSchemaRegistry,
) -> Result<CheckReport, KeyrackError> {
    let doc = load_export(path)?;
    Ok(check_document(&doc, registry))
}

/// Read the masked export written by `keyrack setup`.
pub fn load_export(path: &Path) -> Result<ExportDocument, KeyrackError> {
    let raw = std::fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            KeyrackError::Other(format!(
                "No export file found at {}. Run `keyrack setup` first.",
                path.display()
            ))
        } else {
            KeyrackError::Io(e)
        }
    })?;

    serde_json::from_str(&raw).map_err(|e| {
        KeyrackError::Other(format!("Export file {} is corrupted: {}", path.display(), e))
    })
}

fn check_document(doc: &ExportDocument, registry: &PlatformSchemaRegistry) -> CheckReport {
    let mut report = CheckReport::default();

    if doc.platforms.is_empty() {
        report
            .warnings
            .push("No platforms configured".to_string());
    }

    for (id, entry) in &doc.platforms {
        let schema = match registry.get(id) {
            Ok(schema) => schema,
            Err(_) => {
                report.problems.push(format!("{}: unknown platform", id));
                continue;
            }
        };

        let before = report.problems.len();

        if entry.display_name != schema.display_name() {
            report.problems.push(format!(
                "{}: display name '{}' does not match '{}'",
                id,
                entry.display_name,
                schema.display_name()
            ));
        }

        let names: Vec<&str> = entry.fields.iter().map(|f| f.field.as_str()).collect();
        if names != schema.fields() {
            report.problems.push(format!(
                "{}: fields [{}] do not match schema [{}]",
                id,
                names.join(", "),
                schema.fields().join(", ")
            ));
        }

        for field in &entry.fields {
            if is_sensitive(&field.field) && field.value != MASK {
                report
                    .problems
                    .push(format!("{}: field '{}' is not masked", id, field.field));
            } else if field.value.trim().is_empty() {
                report
                    .problems
                    .push(format!("{}: field '{}' is empty", id, field.field));
            }
        }

        if report.problems.len() == before {
            report.configured.push(id.clone());
        }
    }

    report
}

// ─── Tests ───────────────────────────────────────────────────────────────────
