#![doc = include_str!("../README.md")]
#![deny(unsafe_code)]
#![deny(unused_crate_dependencies)]

mod client;
mod config;
mod error;
mod exercise;
mod http;
mod port;

// ============================================================================
// Public API
// ============================================================================

// Client
pub use client::{DefaultReportClient, ReportClient};
pub use exercise::{DefaultExerciseClient, ExerciseClient};

// Configuration
pub use config::ReportClientConfig;

// Errors
pub use error::{ReportError, ReportResult};

// Transport seam
pub use http::{HttpBackend, ReqwestBackend};

// Silence unused dev-dependency warnings
#[cfg(test)]
use tokio_test as _;
