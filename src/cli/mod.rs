// Keyrack — CLI Module
//
// Command-line interface using clap derive macros.
// Subcommands: platforms, setup, show, check, serve.

mod check;
mod commands;
mod wizard;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use check::{check_export, load_export, CheckReport};
pub use commands::execute;

/// Keyrack: per-platform API credential registry.
#[derive(Parser, Debug)]
#[command(name = "keyrack")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List supported platforms and the fields each one requires.
    Platforms,

    /// Interactively enter credentials and write a masked export.
    Setup {
        /// Configure this platform without the selection prompt.
        #[arg(long)]
        platform: Option<String>,

        /// Where to write the masked export (defaults to KEYRACK_EXPORT or the data dir).
        #[arg(long)]
        export: Option<PathBuf>,
    },

    /// Print the masked export, one platform at a time.
    Show {
        /// The export file to read (defaults to KEYRACK_EXPORT or the data dir).
        #[arg(long)]
        path: Option<PathBuf>,
    },

    /// Validate a masked export document.
    Check {
        /// The export file to validate (defaults to KEYRACK_EXPORT or the data dir).
        #[arg(long)]
        path: Option<PathBuf>,
    },

    /// Start the JSON-RPC gateway on a Unix domain socket.
    Serve {
        /// Socket path (defaults to KEYRACK_SOCKET or $XDG_RUNTIME_DIR/keyrack/keyrack.sock).
        #[arg(long)]
        socket: Option<PathBuf>,
    },
}
