// Keyrack — CLI Command Handlers
//
// Each function handles one CLI subcommand. Credentials only live in memory:
// `setup` persists the masked export, and `serve` keeps a store alive for the
// lifetime of the gateway process.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::Config;
use crate::error::KeyrackError;
use crate::gateway::UdsServer;
use crate::registry::PlatformSchemaRegistry;
use crate::store::{
    export_all_masked, is_sensitive, CredentialStore, ExportDocument, InMemoryCredentialStore,
};

use super::check::{check_export, load_export};
use super::wizard;
use super::Commands;

/// Execute the parsed CLI command.
pub async fn execute(command: Commands, config: &Config) -> Result<(), KeyrackError> {
    match command {
        Commands::Platforms => cmd_platforms(),
        Commands::Setup { platform, export } => {
            cmd_setup(platform, export.unwrap_or_else(|| config.export_path.clone()))
        }
        Commands::Show { path } => cmd_show(&path.unwrap_or_else(|| config.export_path.clone())),
        Commands::Check { path } => {
            cmd_check(&path.unwrap_or_else(|| config.export_path.clone()))
        }
        Commands::Serve { socket } => {
            cmd_serve(socket.unwrap_or_else(|| config.socket_path.clone())).await
        }
    }
}

// ─── Platforms ───────────────────────────────────────────────────────────────

fn cmd_platforms() -> Result<(), KeyrackError> {
    let registry = PlatformSchemaRegistry::builtin();

    println!("Supported platforms ({}):\n", registry.list().len());
    for schema in registry.list() {
        let fields: Vec<String> = schema
            .fields()
            .iter()
            .map(|f| {
                if is_sensitive(f) {
                    format!("{}*", f)
                } else {
                    f.clone()
                }
            })
            .collect();
        println!(
            "  {:10} │ {:12} │ {}",
            schema.id(),
            schema.display_name(),
            fields.join(", ")
        );
    }
    println!("\n  * sensitive, always masked on display");

    Ok(())
}

// ─── Setup ───────────────────────────────────────────────────────────────────

fn cmd_setup(platform: Option<String>, export_path: PathBuf) -> Result<(), KeyrackError> {
    let store = InMemoryCredentialStore::with_builtin_catalog();

    if let Some(ref id) = platform {
        // Fail before any prompt is shown.
        store.registry().get(id)?;
    }

    wizard::run(&store, platform)?;

    let configured = store.list_configured();
    if configured.is_empty() {
        println!("No platforms configured; nothing written.");
        return Ok(());
    }

    println!("Configured platforms ({}):", configured.len());
    for id in &configured {
        let name = store.registry().get(id)?.display_name();
        println!("  {}", name);
        for entry in store.masked_view(id)? {
            println!("    {:20} {}", entry.field, entry.value);
        }
    }

    write_export(&store, &export_path)?;
    println!("\n✓ Masked export written to {}", export_path.display());
    println!("Next: verify it with `keyrack check --path {}`", export_path.display());

    Ok(())
}

fn write_export(store: &dyn CredentialStore, path: &Path) -> Result<(), KeyrackError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let doc = export_all_masked(store);
    let json = serde_json::to_string_pretty(&doc)?;
    std::fs::write(path, json)?;

    tracing::info!(
        path = %path.display(),
        platforms = doc.platforms.len(),
        "Masked export written"
    );
    Ok(())
}

// ─── Show ────────────────────────────────────────────────────────────────────

fn cmd_show(path: &Path) -> Result<(), KeyrackError> {
    let doc = load_export(path)?;
    print!("{}", render_export(&doc));
    Ok(())
}

/// Human-readable listing of a masked export.
fn render_export(doc: &ExportDocument) -> String {
    if doc.platforms.is_empty() {
        return "No platforms configured.\n".to_string();
    }

    let mut out = format!("Configured platforms ({}):\n", doc.platforms.len());
    for (id, entry) in &doc.platforms {
        out.push_str(&format!("\n  {} ({})\n", entry.display_name, id));
        for field in &entry.fields {
            out.push_str(&format!("    {:20} {}\n", field.field, field.value));
        }
    }
    out
}

// ─── Check ───────────────────────────────────────────────────────────────────

fn cmd_check(path: &Path) -> Result<(), KeyrackError> {
    let registry = PlatformSchemaRegistry::builtin();

    println!("Checking {}\n", path.display());
    let report = check_export(path, &registry)?;

    for id in &report.configured {
        println!("  ✓ {} is configured", id);
    }
    for warning in &report.warnings {
        println!("  ! {}", warning);
    }
    for problem in &report.problems {
        println!("  ✗ {}", problem);
    }

    if report.is_valid() {
        println!("\n✓ Export is valid");
        Ok(())
    } else {
        Err(KeyrackError::Other(format!(
            "export failed validation with {} problem(s)",
            report.problems.len()
        )))
    }
}

// ─── Serve ───────────────────────────────────────────────────────────────────

async fn cmd_serve(socket_path: PathBuf) -> Result<(), KeyrackError> {
    let store = Arc::new(InMemoryCredentialStore::with_builtin_catalog());
    let server = UdsServer::new(store, socket_path);

    println!(
        "Starting Keyrack UDS server at {}...",
        server.socket_path().display()
    );

    let outcome = tokio::select! {
        result = server.run() => result.map_err(KeyrackError::from),
        signal = shutdown_signal() => {
            tracing::info!(signal, "Shutting down");
            Ok(())
        }
    };

    server.cleanup()?;
    outcome
}

/// Resolve on Ctrl-C, or SIGTERM on Unix.
async fn shutdown_signal() -> &'static str {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut term) => tokio::select! {
                _ = tokio::signal::ctrl_c() => "SIGINT",
                _ = term.recv() => "SIGTERM",
            },
            Err(e) => {
                tracing::warn!("Cannot install SIGTERM handler: {}", e);
                let _ = tokio::signal::ctrl_c().await;
                "SIGINT"
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
        "SIGINT"
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
