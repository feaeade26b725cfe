//! Validate-config command implementation

use crate::cli::{EXIT_CONFIG, EXIT_SUCCESS};
use crate::config::{load_config, StoreTarget};
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");
        println!("🔍 Validating configuration file: {config_path}");
        println!();

        let config = match load_config(config_path) {
            Ok(c) => {
                println!("✅ Configuration file loaded successfully");
                c
            }
            Err(e) => {
                println!("❌ Failed to load configuration file");
                println!("   Error: {e}");
                return Ok(EXIT_CONFIG);
            }
        };

        if let Err(e) = config.validate() {
            println!("❌ Configuration validation failed");
            println!("   Error: {e}");
            println!();
            return Ok(EXIT_CONFIG);
        }

        println!("✅ Configuration is valid");
        println!();
        println!("Configuration Summary:");
        println!("  Environment: {:?}", config.environment);
        println!("  Log Level: {}", config.application.log_level);
        println!("  Dry Run: {}", config.application.dry_run);
        println!("  OpenELIS Server: {}", config.elis.base_url);
        match (config.store_target, &config.openmrs) {
            (StoreTarget::OpenMrs, Some(openmrs)) => {
                println!("  Store Target: OpenMRS");
                println!("  OpenMRS Server: {}", openmrs.base_url);
                println!("  OpenMRS User: {}", openmrs.username);
            }
            _ => println!("  Store Target: in-memory"),
        }
        println!("  Lab Encounter Type: {}", config.lab.encounter_type);
        println!("  Lab Order Type: {}", config.lab.order_type);
        println!("  CSV Date Formats: {:?}", config.csv.date_formats);
        println!();
        Ok(EXIT_SUCCESS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn test_validate_memory_config() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
store_target = "memory"

[elis]
base_url = "http://localhost:8052"
"#
        )
        .unwrap();

        let code = ValidateArgs {}
            .execute(file.path().to_str().unwrap())
            .await
            .unwrap();
        assert_eq!(code, EXIT_SUCCESS);
    }

    #[tokio::test]
    async fn test_validate_missing_openmrs_section() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[elis]\nbase_url = \"http://localhost:8052\"").unwrap();

        let code = ValidateArgs {}
            .execute(file.path().to_str().unwrap())
            .await
            .unwrap();
        assert_eq!(code, EXIT_CONFIG);
    }
}
