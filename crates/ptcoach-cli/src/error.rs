//! CLI-specific error types and exit codes.

use ptcoach_core::{ExercisePortError, ReportPortError, SettingsError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    /// Argument error that clap cannot express (missing fallback values).
    #[error("Invalid arguments: {0}")]
    Arguments(String),

    /// IO error (file not found, permission denied, etc.).
    #[error("IO error: {0}")]
    Io(String),

    /// Settings file or override problem.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Transcript file could not be interpreted.
    #[error("Invalid transcript: {0}")]
    Transcript(String),

    /// A backend refused or failed the request.
    #[error("Backend error: {0}")]
    Backend(String),

    /// A backend could not be reached.
    #[error("Backend unavailable: {0}")]
    Unavailable(String),
}

impl CliError {
    /// Map error to an exit code (sysexits.h where one fits).
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Arguments(_) => 2,     // EX_USAGE
            Self::Transcript(_) => 65,   // EX_DATAERR
            Self::Unavailable(_) => 69,  // EX_UNAVAILABLE
            Self::Io(_) => 74,           // EX_IOERR
            Self::Backend(_) => 76,      // EX_PROTOCOL
            Self::Config(_) => 78,       // EX_CONFIG
        }
    }
}

impl From<SettingsError> for CliError {
    fn from(err: SettingsError) -> Self {
        match err {
            SettingsError::Io { .. } => Self::Io(err.to_string()),
            _ => Self::Config(err.to_string()),
        }
    }
}

impl From<ReportPortError> for CliError {
    fn from(err: ReportPortError) -> Self {
        match err {
            ReportPortError::InvalidRequest(msg) => Self::Arguments(msg),
            ReportPortError::Backend(msg) => Self::Backend(msg),
            ReportPortError::Unreachable(msg) => Self::Unavailable(msg),
        }
    }
}

impl From<ExercisePortError> for CliError {
    fn from(err: ExercisePortError) -> Self {
        match err {
            ExercisePortError::InvalidRequest(msg) => Self::Arguments(msg),
            ExercisePortError::Backend(msg) => Self::Backend(msg),
            ExercisePortError::Unreachable(msg) => Self::Unavailable(msg),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}
