//! Command handlers.
//!
//! Each handler parses CLI-specific input, calls into the library crates and
//! formats output for the terminal. Logs go to stderr, results to stdout.

pub mod agents;
pub mod exercises;
pub mod report;
pub mod settings;
