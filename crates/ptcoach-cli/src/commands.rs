//! Available subcommands.

use std::path::PathBuf;

use clap::{Subcommand, ValueEnum};
use ptcoach_core::LlmProvider;

#[derive(Subcommand)]
pub enum Commands {
    /// Print the effective settings (file, environment and defaults) as JSON
    Settings,

    /// List the conversational agents and the tools each one can call
    Agents,

    /// Submit a saved session transcript for report generation
    Report {
        /// Exercise identifier known to the backend
        #[arg(long)]
        exercise_id: String,
        /// JSON transcript: an array of {role, content} or {"conversation_history": [...]}
        #[arg(long)]
        transcript: PathBuf,
        /// Patient identifier (falls back to the configured patient id)
        #[arg(long)]
        patient_id: Option<String>,
        /// Report endpoint (falls back to the configured endpoint)
        #[arg(long)]
        endpoint: Option<String>,
    },

    /// Register a patient from a JSON profile and print the assigned id
    Onboard {
        /// JSON file with name, age, injury, pain_level, frequency, time_of_day,
        /// notification_time and goal
        #[arg(long)]
        profile: PathBuf,
        /// Exercise backend base URL (falls back to the configured URL)
        #[arg(long)]
        base_url: Option<String>,
    },

    /// Print a patient's exercise plan, generating it on first request
    Exercises {
        /// Patient identifier (falls back to the configured patient id)
        #[arg(long)]
        patient_id: Option<String>,
        /// Model the backend writes new exercises with
        #[arg(long, value_enum, default_value_t = Provider::Claude)]
        provider: Provider,
        /// Exercise backend base URL (falls back to the configured URL)
        #[arg(long)]
        base_url: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Provider {
    Claude,
    Openai,
}

impl From<Provider> for LlmProvider {
    fn from(provider: Provider) -> Self {
        match provider {
            Provider::Claude => Self::Claude,
            Provider::Openai => Self::OpenAi,
        }
    }
}
