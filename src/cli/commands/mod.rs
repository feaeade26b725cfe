//! CLI command implementations

pub mod import_csv;
pub mod init;
pub mod process_event;
pub mod validate;

use crate::config::{load_config, BridgeConfig};

/// Loads and validates the configuration, printing the failure
///
/// Returns `None` when the command should stop with a configuration error.
pub(crate) fn load_valid_config(config_path: &str) -> Option<BridgeConfig> {
    let config = match load_config(config_path) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Failed to load configuration");
            eprintln!("❌ Failed to load configuration: {e}");
            return None;
        }
    };

    if let Err(e) = config.validate() {
        tracing::error!(error = %e, "Configuration validation failed");
        eprintln!("❌ Configuration validation failed: {e}");
        return None;
    }
    Some(config)
}
