//! Init command implementation

use crate::cli::{EXIT_CONFIG, EXIT_FATAL, EXIT_SUCCESS};
use clap::Args;
use std::fs;
use std::path::Path;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = "bahmni-bridge.toml")]
    pub output: String,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");
        println!("📝 Initializing bahmni-bridge configuration");
        println!();

        if Path::new(&self.output).exists() && !self.force {
            println!("❌ Configuration file already exists: {}", self.output);
            println!("   Use --force to overwrite");
            return Ok(EXIT_CONFIG);
        }

        if let Err(e) = fs::write(&self.output, sample_config()) {
            println!("❌ Failed to write configuration file");
            println!("   Error: {e}");
            return Ok(EXIT_FATAL);
        }

        println!("✅ Configuration file created: {}", self.output);
        println!();
        println!("Next steps:");
        println!("  1. Edit {} with your server URLs", self.output);
        println!("  2. Set BAHMNI_OPENMRS_USERNAME and BAHMNI_OPENMRS_PASSWORD (or use a .env file)");
        println!("  3. Validate configuration: bahmni-bridge validate-config");
        println!();
        Ok(EXIT_SUCCESS)
    }
}

/// Sample configuration with every section and its defaults
pub fn sample_config() -> &'static str {
    r#"# bahmni-bridge configuration

environment = "development"  # development | staging | production
store_target = "openmrs"     # openmrs | memory

[application]
log_level = "info"
dry_run = false

[elis]
base_url = "http://localhost:8052"
timeout_seconds = 60
tls_verify = true

[openmrs]
base_url = "http://localhost:8050/openmrs"
username = "${BAHMNI_OPENMRS_USERNAME}"
password = "${BAHMNI_OPENMRS_PASSWORD}"
timeout_seconds = 60
tls_verify = true

[lab]
encounter_type = "LAB_RESULT"
order_type = "Lab Order"
# lab_system_provider_uuid = "..."
cancellation_reason = "Canceled in OpenELIS"

[csv]
form2_prefix = "form2"
obs_column_prefix = "Obs."
date_formats = ["%Y-%m-%d", "%d-%m-%Y"]

[logging]
local_enabled = true
local_path = "/var/log/bahmni-bridge"
local_rotation = "daily"  # daily | hourly | never
"#
}
