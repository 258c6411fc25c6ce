// Keyrack — Library root
//
// Re-exports the registry, store, config, CLI, and gateway modules.

pub mod cli;
pub mod config;
pub mod error;
pub mod gateway;
pub mod registry;
pub mod store;

pub use error::{KeyrackError, Result};
