//! CLI interface and argument parsing
//!
//! Exit codes: `0` success, `1` partial success, `2` configuration error,
//! `4` connection error, `5` fatal error.

pub mod commands;

use crate::domain::{BridgeError, ElisError, OpenMrsError};
use clap::{Parser, Subcommand};

pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_PARTIAL: i32 = 1;
pub const EXIT_CONFIG: i32 = 2;
pub const EXIT_CONNECTION: i32 = 4;
pub const EXIT_FATAL: i32 = 5;

/// Bahmni bridge - OpenELIS and CSV integration for OpenMRS
#[derive(Parser, Debug)]
#[command(name = "bahmni-bridge")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "bahmni-bridge.toml", env = "BAHMNI_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "BAHMNI_LOG_LEVEL")]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Process one OpenELIS feed event
    ProcessEvent(commands::process_event::ProcessEventArgs),

    /// Import encounters from a CSV file
    ImportCsv(commands::import_csv::ImportCsvArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}

/// Exit code for an error that stopped a command
pub fn exit_code_for(error: &BridgeError) -> i32 {
    match error {
        BridgeError::Configuration(_) => EXIT_CONFIG,
        BridgeError::Elis(ElisError::ConnectionFailed(_) | ElisError::Timeout(_))
        | BridgeError::OpenMrs(
            OpenMrsError::ConnectionFailed(_) | OpenMrsError::AuthenticationFailed(_),
        ) => EXIT_CONNECTION,
        _ => EXIT_FATAL,
    }
}
