// Bahmni Bridge - OpenELIS and CSV integration for OpenMRS
// Copyright (c) 2025 Bahmni Bridge Contributors
// Licensed under the MIT License

use bahmni_bridge::cli::{Cli, Commands, EXIT_FATAL};
use bahmni_bridge::config::LoggingConfig;
use bahmni_bridge::logging::init_logging;
use clap::Parser;
use std::process;

#[tokio::main]
async fn main() {
    // .env is optional
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // Console-only logging for the CLI
    let log_level = cli.log_level.as_deref().unwrap_or("info");
    let logging_config = LoggingConfig {
        local_enabled: false,
        ..LoggingConfig::default()
    };
    if let Err(e) = init_logging(log_level, &logging_config) {
        eprintln!("Failed to initialize logging: {e}");
        process::exit(EXIT_FATAL);
    }

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        "Bahmni Bridge - OpenELIS and CSV integration for OpenMRS"
    );

    let exit_code = match execute_command(&cli).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %e, "Command execution failed");
            eprintln!("Error: {e}");
            EXIT_FATAL
        }
    };
    process::exit(exit_code);
}

async fn execute_command(cli: &Cli) -> anyhow::Result<i32> {
    match &cli.command {
        Commands::ProcessEvent(args) => args.execute(&cli.config).await,
        Commands::ImportCsv(args) => args.execute(&cli.config).await,
        Commands::ValidateConfig(args) => args.execute(&cli.config).await,
        Commands::Init(args) => args.execute().await,
    }
}
