// Keyrack — Runtime configuration
//
// Settings come from the process environment, optionally seeded from a
// `.env` file in the working directory. Command-line flags override them.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::PathBuf;

const LOG_VAR: &str = "KEYRACK_LOG";
const SOCKET_VAR: &str = "KEYRACK_SOCKET";
const EXPORT_VAR: &str = "KEYRACK_EXPORT";

const DEFAULT_LOG_FILTER: &str = "keyrack=info";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// `tracing` filter directive used when `RUST_LOG` is unset.
    pub log_filter: String,
    /// Unix socket the gateway listens on.
    pub socket_path: PathBuf,
    /// Where `setup` writes, and `check` reads, the masked export document.
    pub export_path: PathBuf,
}

impl Config {
    /// Read settings from the environment. Call [`load_env_file`] first to
    /// pick up `.env` values.
    pub fn from_env() -> Self {
        Self::from_vars(&std::env::vars().collect())
    }

    /// Build a config from an explicit variable map. Blank values count as unset.
    pub fn from_vars(vars: &HashMap<String, String>) -> Self {
        let get = |key: &str| {
            vars.get(key)
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };

        let runtime_dir = get("XDG_RUNTIME_DIR").map(PathBuf::from);

        Self {
            log_filter: get(LOG_VAR).unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string()),
            socket_path: get(SOCKET_VAR)
                .map(PathBuf::from)
                .unwrap_or_else(|| default_socket_path(runtime_dir)),
            export_path: get(EXPORT_VAR)
                .map(PathBuf::from)
                .unwrap_or_else(default_export_path),
        }
    }
}

/// Seed the environment from `.env` in the working directory.
///
/// No file is fine; an unreadable or malformed one is returned so the caller
/// can report it once logging is up.
pub fn load_env_file() -> Result<(), dotenvy::Error> {
    ignore_missing(dotenvy::dotenv().map(|_| ()))
}

fn ignore_missing(result: Result<(), dotenvy::Error>) -> Result<(), dotenvy::Error> {
    match result {
        Err(dotenvy::Error::Io(e)) if e.kind() == ErrorKind::NotFound => Ok(()),
        other => other,
    }
}

/// `$XDG_RUNTIME_DIR/keyrack/keyrack.sock`, falling back to `/tmp`.
fn default_socket_path(runtime_dir: Option<PathBuf>) -> PathBuf {
    runtime_dir
        .unwrap_or_else(|| PathBuf::from("/tmp"))
        .join("keyrack")
        .join("keyrack.sock")
}

/// `<data dir>/keyrack/credentials.json`.
fn default_export_path() -> PathBuf {
    let base = dirs_next::data_dir().unwrap_or_else(|| PathBuf::from("."));
    base.join("keyrack").join("credentials.json")
}

// ─── Tests ───────────────────────────────────────────────────────────────────
