//! `ptcoach` command-line adapter.
//!
//! Inspects settings and agents, onboards patients and fetches their exercise
//! plans, and submits saved session transcripts to the report backend. `main.rs` is the composition root; handlers stay thin.

#![deny(unsafe_code)]
#![deny(unused_crate_dependencies)]

// Silence unused dev-dependency warnings
#[cfg(test)]
use tokio_test as _;

// Used by the binary target only
use dotenvy as _;
use tokio as _;
use tracing_subscriber as _;

pub mod bootstrap;
pub mod commands;
pub mod error;
pub mod handlers;
pub mod parser;

// Re-export primary types for convenient access
pub use bootstrap::{effective_settings, load_settings};
pub use commands::Commands;
pub use error::CliError;
pub use parser::Cli;
