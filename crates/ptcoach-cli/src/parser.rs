//! Main CLI parser and top-level argument handling.

use std::path::PathBuf;

use clap::Parser;

use crate::commands::Commands;

/// Physical-therapy coach companion tools.
#[derive(Parser)]
#[command(name = "ptcoach")]
#[command(about = "Inspect ptcoach configuration, onboard patients and generate exercise reports")]
#[command(version)]
pub struct Cli {
    /// Settings file (defaults to <config dir>/ptcoach/settings.json)
    #[arg(long, global = true, env = "PTCOACH_SETTINGS")]
    pub settings: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::Provider;
    use clap::CommandFactory;

    #[test]
    fn test_cli_parser_builds() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_settings_after_subcommand() {
        let cli = Cli::parse_from(["ptcoach", "agents", "--settings", "/tmp/s.json"]);
        assert_eq!(cli.settings, Some(PathBuf::from("/tmp/s.json")));
        assert!(matches!(cli.command, Commands::Agents));
    }

    #[test]
    fn test_report_args() {
        let cli = Cli::parse_from([
            "ptcoach",
            "report",
            "--exercise-id",
            "knee-bend",
            "--transcript",
            "session.json",
            "--patient-id",
            "p-1",
        ]);
        let Commands::Report {
            exercise_id,
            transcript,
            patient_id,
            endpoint,
        } = cli.command
        else {
            panic!("expected report command");
        };
        assert_eq!(exercise_id, "knee-bend");
        assert_eq!(transcript, PathBuf::from("session.json"));
        assert_eq!(patient_id.as_deref(), Some("p-1"));
        assert!(endpoint.is_none());
    }

    #[test]
    fn test_exercises_args() {
        let cli = Cli::parse_from(["ptcoach", "exercises", "--patient-id", "p-1", "--provider", "openai"]);
        let Commands::Exercises {
            patient_id,
            provider,
            base_url,
        } = cli.command
        else {
            panic!("expected exercises command");
        };
        assert_eq!(patient_id.as_deref(), Some("p-1"));
        assert_eq!(provider, Provider::Openai);
        assert!(base_url.is_none());

        let cli = Cli::parse_from(["ptcoach", "exercises"]);
        assert!(matches!(
            cli.command,
            Commands::Exercises {
                provider: Provider::Claude,
                ..
            }
        ));
    }

    #[test]
    fn test_onboard_requires_profile() {
        assert!(Cli::try_parse_from(["ptcoach", "onboard"]).is_err());
    }

    #[test]
    fn test_report_requires_exercise_id() {
        assert!(Cli::try_parse_from(["ptcoach", "report", "--transcript", "t.json"]).is_err());
    }
}
