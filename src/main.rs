use std::process::ExitCode;

use clap::Parser;
use headwatch::SetupError;
use headwatch::cli::commands::{init, sync, tree, watch};
use headwatch::cli::{Cli, Commands};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let settings = match cli.load_settings() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            return ExitCode::FAILURE;
        }
    };

    headwatch::logging::init_with_config(&settings.logging);

    let result = match cli.command.clone().unwrap_or_default() {
        Commands::Watch => watch::run(settings).await,
        Commands::Sync => sync::run(settings),
        Commands::Tree => tree::run(&settings),
        Commands::Init { force } => init::run_init(settings, force),
        Commands::Config => init::run_config(&settings),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            if e
                .downcast_ref::<SetupError>()
                .is_some_and(SetupError::is_fatal_config)
            {
                eprintln!("The manifest file is required; check that the project root is writable.");
            }
            ExitCode::FAILURE
        }
    }
}
