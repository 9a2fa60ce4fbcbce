//! CLI entry point - the composition root.

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use ptcoach_cli::handlers::exercises::{ExercisesArgs, OnboardArgs};
use ptcoach_cli::handlers::report::ReportArgs;
use ptcoach_cli::{Cli, CliError, Commands, handlers, load_settings};

#[tokio::main]
async fn main() -> ExitCode {
    // Load environment variables before anything reads them
    dotenvy::dotenv().ok();

    // Initialize logging (stderr, so stdout stays machine-readable)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            let code = err
                .downcast_ref::<CliError>()
                .map_or(1, CliError::exit_code);
            ExitCode::from(u8::try_from(code).unwrap_or(1))
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let settings = load_settings(cli.settings.as_deref(), |key| std::env::var(key).ok())?;

    match cli.command {
        Commands::Settings => handlers::settings::execute(&settings)?,
        Commands::Agents => handlers::agents::execute()?,
        Commands::Report {
            exercise_id,
            transcript,
            patient_id,
            endpoint,
        } => {
            let args = ReportArgs {
                exercise_id,
                transcript,
                patient_id,
                endpoint,
            };
            handlers::report::execute(&settings, args).await?;
        }
        Commands::Onboard { profile, base_url } => {
            handlers::exercises::onboard(&settings, OnboardArgs { profile, base_url }).await?;
        }
        Commands::Exercises {
            patient_id,
            provider,
            base_url,
        } => {
            let args = ExercisesArgs {
                patient_id,
                provider: provider.into(),
                base_url,
            };
            handlers::exercises::exercises(&settings, args).await?;
        }
    }
    Ok(())
}
