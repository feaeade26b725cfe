//! Configuration management for the bridge.
//!
//! # Overview
//!
//! The bridge reads a single TOML file with support for:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - `BAHMNI_<SECTION>_<KEY>` environment overrides
//! - Default values for optional settings
//! - Validation on load
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use bahmni_bridge::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("bahmni-bridge.toml")?;
//! println!("OpenELIS: {}", config.elis.base_url);
//! println!("Lab encounter type: {}", config.lab.encounter_type);
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration Structure
//!
//! - [`ApplicationConfig`] - log level, dry run
//! - [`ElisConfig`] - OpenELIS connection
//! - [`OpenMrsConfig`] - OpenMRS connection and credentials
//! - [`LabConfig`] - lab encounter and order settings
//! - [`CsvConfig`] - CSV import settings
//! - [`LoggingConfig`] - file logging
//!
//! # Example Configuration
//!
//! ```toml
//! environment = "production"
//! store_target = "openmrs"
//!
//! [application]
//! log_level = "info"
//!
//! [elis]
//! base_url = "https://openelis.example.org"
//!
//! [openmrs]
//! base_url = "https://emr.example.org/openmrs"
//! username = "admin"
//! password = "${BAHMNI_OPENMRS_PASSWORD}"
//!
//! [lab]
//! encounter_type = "LAB_RESULT"
//! lab_system_provider_uuid = "f9badd80-ab76-11e2-9e96-0800200c9a66"
//! ```

pub mod loader;
pub mod schema;
pub mod secret;

pub use loader::load_config;
pub use schema::{
    ApplicationConfig, BridgeConfig, CsvConfig, ElisConfig, Environment, LabConfig,
    LoggingConfig, OpenMrsConfig, StoreTarget,
};
pub use secret::{basic_auth_header, secret_string, SecretString, SecretValue};
