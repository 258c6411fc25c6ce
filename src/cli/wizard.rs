// Keyrack — Interactive setup wizard
//
// Prompts for each declared field of a platform, masking input for sensitive
// fields, and re-prompts only the fields the store reported missing.

use std::fmt;

use inquire::{Confirm, InquireError, Password, PasswordDisplayMode, Select, Text};

use crate::error::KeyrackError;
use crate::registry::PlatformSchema;
use crate::store::{is_sensitive, CredentialStore, FieldMap, StoreError};

/// Select-list entry for a platform.
struct PlatformChoice<'a>(&'a PlatformSchema);

impl fmt::Display for PlatformChoice<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.0.display_name(), self.0.id())
    }
}

/// Run the wizard against `store` until the user stops adding platforms.
///
/// Esc or Ctrl-C on any prompt ends the session; platforms already saved
/// stay in the store.
pub fn run(store: &dyn CredentialStore, preselected: Option<String>) -> Result<(), KeyrackError> {
    println!("Keyrack setup\n");

    let mut next = preselected;
    loop {
        match configure_next(store, next.take()) {
            Ok(true) => continue,
            Ok(false) => return Ok(()),
            Err(e) if is_cancellation(&e) => {
                println!(
                    "\nSetup stopped; keeping {} configured platform(s).",
                    store.list_configured().len()
                );
                return Ok(());
            }
            Err(e) => return Err(e),
        }
    }
}

/// Configure one platform. Returns whether the user wants another.
fn configure_next(
    store: &dyn CredentialStore,
    preselected: Option<String>,
) -> Result<bool, KeyrackError> {
    let schema = match preselected {
        Some(id) => store.registry().get(&id)?,
        None => select_platform(store)?,
    };

    let replace = !store.list_configured().contains(schema.id())
        || Confirm::new(&format!(
            "{} is already configured. Replace it?",
            schema.display_name()
        ))
        .with_default(false)
        .prompt()?;

    if replace {
        configure(store, schema)?;
    }

    Ok(Confirm::new("Configure another platform?")
        .with_default(false)
        .prompt()?)
}

fn is_cancellation(err: &KeyrackError) -> bool {
    matches!(
        err,
        KeyrackError::Prompt(
            InquireError::OperationCanceled | InquireError::OperationInterrupted
        )
    )
}

fn select_platform(store: &dyn CredentialStore) -> Result<&PlatformSchema, KeyrackError> {
    let choices: Vec<PlatformChoice<'_>> = store
        .registry()
        .list()
        .iter()
        .map(PlatformChoice)
        .collect();

    let choice = Select::new("Select a platform:", choices).prompt()?;
    Ok(choice.0)
}

/// Prompt until the store accepts a complete record for `schema`.
fn configure(store: &dyn CredentialStore, schema: &PlatformSchema) -> Result<(), KeyrackError> {
    let mut fields = FieldMap::new();
    let mut pending: Vec<String> = schema.fields().to_vec();

    loop {
        for name in &pending {
            let value = prompt_field(schema, name)?;
            fields.insert(name.clone(), value);
        }

        match store.upsert(schema.id(), &fields) {
            Ok(()) => {
                println!("✓ {} credentials saved", schema.display_name());
                for entry in store.masked_view(schema.id())? {
                    println!("  {:20} {}", entry.field, entry.value);
                }
                println!();
                return Ok(());
            }
            Err(StoreError::IncompleteCredentials(missing)) => {
                println!("Missing required fields: {}", missing.join(", "));
                pending = missing;
            }
            Err(e) => return Err(e.into()),
        }
    }
}

fn prompt_field(schema: &PlatformSchema, name: &str) -> Result<String, KeyrackError> {
    let label = format!("{} {}:", schema.display_name(), name);

    let value = if is_sensitive(name) {
        Password::new(&label)
            .with_display_mode(PasswordDisplayMode::Masked)
            .without_confirmation()
            .prompt()?
    } else {
        Text::new(&label).prompt()?
    };
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::PlatformSchemaRegistry;

    #[test]
    fn test_platform_choice_label() {
        let registry = PlatformSchemaRegistry::builtin();
        let choice = PlatformChoice(registry.get("twitter").unwrap());
        assert_eq!(choice.to_string(), "Twitter / X (twitter)");
    }

    #[test]
    fn test_escape_and_ctrl_c_end_the_session() {
        assert!(is_cancellation(&KeyrackError::Prompt(
            InquireError::OperationCanceled
        )));
        assert!(is_cancellation(&KeyrackError::Prompt(
            InquireError::OperationInterrupted
        )));
        assert!(!is_cancellation(&KeyrackError::Prompt(
            InquireError::NotTTY
        )));
        assert!(!is_cancellation(&KeyrackError::Other("boom".to_string())));
    }

    #[test]
    fn test_unknown_platform_is_not_a_cancellation() {
        let store = crate::store::InMemoryCredentialStore::with_builtin_catalog();
        let fields: FieldMap = [("bot_token", "abc123"), ("chat_id", "-100")]
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        store.upsert("telegram", &fields).unwrap();

        // An unknown preselected platform is a real error, not a cancellation.
        let err = run(&store, Some("myspace".to_string())).unwrap_err();
        assert!(!is_cancellation(&err));
        assert!(store.list_configured().contains("telegram"));
    }
}
