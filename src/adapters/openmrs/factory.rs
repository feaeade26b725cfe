//! OpenMRS backend factory

use super::client::OpenMrsRestClient;
use super::memory::InMemoryOpenMrs;
use super::traits::OpenMrsServices;
use crate::config::schema::{BridgeConfig, StoreTarget};
use crate::domain::{BridgeError, Result};
use std::sync::Arc;

/// Creates the OpenMRS services selected by `store_target`
///
/// # Errors
///
/// Returns a configuration error if `store_target = "openmrs"` and the
/// `[openmrs]` section is missing, or if the HTTP client cannot be built.
pub fn create_openmrs_services(config: &BridgeConfig) -> Result<OpenMrsServices> {
    match config.store_target {
        StoreTarget::OpenMrs => {
            let openmrs_config = config.openmrs.as_ref().ok_or_else(|| {
                BridgeError::Configuration(
                    "openmrs configuration is required when store_target = 'openmrs'".to_string(),
                )
            })?;

            tracing::info!(base_url = %openmrs_config.base_url, "Creating OpenMRS REST client");
            let client = Arc::new(OpenMrsRestClient::new(openmrs_config)?);
            Ok(OpenMrsServices::from_backend(client))
        }
        StoreTarget::Memory => {
            tracing::info!("Creating in-memory OpenMRS store");
            Ok(OpenMrsServices::from_backend(Arc::new(InMemoryOpenMrs::new())))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{
        ApplicationConfig, CsvConfig, ElisConfig, Environment, LabConfig, LoggingConfig,
    };

    fn config(store_target: StoreTarget) -> BridgeConfig {
        BridgeConfig {
            application: ApplicationConfig::default(),
            environment: Environment::Development,
            store_target,
            elis: ElisConfig::default(),
            openmrs: None,
            lab: LabConfig::default(),
            csv: CsvConfig::default(),
            logging: LoggingConfig::default(),
        }
    }

    #[test]
    fn test_memory_target() {
        assert!(create_openmrs_services(&config(StoreTarget::Memory)).is_ok());
    }

    #[test]
    fn test_openmrs_target_requires_section() {
        let result = create_openmrs_services(&config(StoreTarget::OpenMrs));
        assert!(matches!(result, Err(BridgeError::Configuration(_))));
    }
}
