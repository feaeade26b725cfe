//! Configuration schema types
//!
//! This module defines the configuration structure for the bridge.

use crate::config::SecretString;
use serde::{Deserialize, Serialize};

/// Backend used for OpenMRS encounters, concepts and transactions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StoreTarget {
    /// OpenMRS REST API
    #[default]
    OpenMrs,
    /// Process-local store, used for dry runs and tests
    Memory,
}

/// Runtime environment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Development environment
    #[default]
    Development,
    /// Staging environment
    Staging,
    /// Production environment
    Production,
}

/// Main bridge configuration
///
/// This is the root configuration structure that maps to the TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Runtime environment (development, staging, production)
    #[serde(default)]
    pub environment: Environment,

    /// Where OpenMRS data is read from and written to
    #[serde(default)]
    pub store_target: StoreTarget,

    /// OpenELIS connection
    pub elis: ElisConfig,

    /// OpenMRS connection (required if store_target = openmrs)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub openmrs: Option<OpenMrsConfig>,

    /// Lab encounter settings
    #[serde(default)]
    pub lab: LabConfig,

    /// CSV import settings
    #[serde(default)]
    pub csv: CsvConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl BridgeConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.elis.validate(&self.environment)?;

        match self.store_target {
            StoreTarget::OpenMrs => match self.openmrs {
                Some(ref config) => config.validate(&self.environment)?,
                None => {
                    return Err(
                        "openmrs configuration is required when store_target = 'openmrs'"
                            .to_string(),
                    )
                }
            },
            StoreTarget::Memory => {
                if self.environment == Environment::Production {
                    return Err("store_target = 'memory' is not allowed in production".to_string());
                }
            }
        }

        self.lab.validate()?;
        self.csv.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Dry run mode (don't write to OpenMRS)
    #[serde(default)]
    pub dry_run: bool,
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            dry_run: false,
        }
    }
}

/// OpenELIS server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElisConfig {
    /// Base URL that event content paths are appended to
    pub base_url: String,

    /// Timeout in seconds
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    /// TLS certificate verification enabled
    ///
    /// Must stay `true` in production (enforced by validation).
    #[serde(default = "default_true")]
    pub tls_verify: bool,
}

impl ElisConfig {
    fn validate(&self, environment: &Environment) -> Result<(), String> {
        validate_base_url("elis.base_url", &self.base_url)?;
        validate_tls("elis", self.tls_verify, environment)?;
        if self.timeout_seconds == 0 {
            return Err("elis.timeout_seconds must be > 0".to_string());
        }
        Ok(())
    }
}

impl Default for ElisConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8052".to_string(),
            timeout_seconds: default_timeout_seconds(),
            tls_verify: true,
        }
    }
}

/// OpenMRS server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenMrsConfig {
    /// Base URL of the OpenMRS web application, e.g. `https://emr.example.org/openmrs`
    pub base_url: String,

    pub username: String,

    /// Stored securely in memory and zeroized on drop
    pub password: SecretString,

    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    #[serde(default = "default_true")]
    pub tls_verify: bool,
}

impl OpenMrsConfig {
    fn validate(&self, environment: &Environment) -> Result<(), String> {
        use secrecy::ExposeSecret;

        validate_base_url("openmrs.base_url", &self.base_url)?;

        if self.username.trim().is_empty() {
            return Err("openmrs.username cannot be empty".to_string());
        }
        if self.password.expose_secret().is_empty() {
            return Err("openmrs.password cannot be empty".to_string());
        }
        if self.timeout_seconds == 0 {
            return Err("openmrs.timeout_seconds must be > 0".to_string());
        }

        validate_tls("openmrs", self.tls_verify, environment)
    }
}

/// Lab encounter settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabConfig {
    /// Encounter type name given to lab encounters
    #[serde(default = "default_encounter_type")]
    pub encounter_type: String,

    /// Order type name given to lab test orders
    #[serde(default = "default_order_type")]
    pub order_type: String,

    /// Provider recorded on encounters created from accessions
    #[serde(default)]
    pub lab_system_provider_uuid: Option<String>,

    /// Void reason applied to orders canceled in OpenELIS
    #[serde(default = "default_cancellation_reason")]
    pub cancellation_reason: String,
}

impl LabConfig {
    fn validate(&self) -> Result<(), String> {
        if self.encounter_type.trim().is_empty() {
            return Err("lab.encounter_type cannot be empty".to_string());
        }
        if self.order_type.trim().is_empty() {
            return Err("lab.order_type cannot be empty".to_string());
        }
        if self.cancellation_reason.trim().is_empty() {
            return Err("lab.cancellation_reason cannot be empty".to_string());
        }
        Ok(())
    }
}

impl Default for LabConfig {
    fn default() -> Self {
        Self {
            encounter_type: default_encounter_type(),
            order_type: default_order_type(),
            lab_system_provider_uuid: None,
            cancellation_reason: default_cancellation_reason(),
        }
    }
}

/// CSV import settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CsvConfig {
    /// Key prefix marking form-version 2 observations
    #[serde(default = "default_form2_prefix")]
    pub form2_prefix: String,

    /// Column prefix marking observation columns
    #[serde(default = "default_obs_column_prefix")]
    pub obs_column_prefix: String,

    /// chrono formats tried in order when parsing the encounter date
    #[serde(default = "default_date_formats")]
    pub date_formats: Vec<String>,
}

impl CsvConfig {
    fn validate(&self) -> Result<(), String> {
        if self.form2_prefix.is_empty() {
            return Err("csv.form2_prefix cannot be empty".to_string());
        }
        if self.obs_column_prefix.is_empty() {
            return Err("csv.obs_column_prefix cannot be empty".to_string());
        }
        if self.date_formats.is_empty() {
            return Err("csv.date_formats must contain at least one format".to_string());
        }
        Ok(())
    }
}

impl Default for CsvConfig {
    fn default() -> Self {
        Self {
            form2_prefix: default_form2_prefix(),
            obs_column_prefix: default_obs_column_prefix(),
            date_formats: default_date_formats(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Write JSON logs to local files
    #[serde(default = "default_true")]
    pub local_enabled: bool,

    /// Directory for log files
    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// Rotation policy: daily, hourly or never
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }

        if self.local_enabled && self.local_path.trim().is_empty() {
            return Err("logging.local_path cannot be empty when local logging is enabled".to_string());
        }

        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: true,
            local_path: default_local_path(),
            local_rotation: default_local_rotation(),
        }
    }
}

fn validate_base_url(field: &str, url: &str) -> Result<(), String> {
    if url.is_empty() {
        return Err(format!("{field} cannot be empty"));
    }
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(format!("{field} must start with http:// or https://"));
    }
    Ok(())
}

fn validate_tls(section: &str, tls_verify: bool, environment: &Environment) -> Result<(), String> {
    if *environment == Environment::Production && !tls_verify {
        return Err(format!(
            "{section}.tls_verify cannot be disabled in production environments. \
            For development/testing, set 'environment = \"development\"' or 'environment = \"staging\"'."
        ));
    }
    Ok(())
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_timeout_seconds() -> u64 {
    60
}

fn default_encounter_type() -> String {
    "LAB_RESULT".to_string()
}

fn default_order_type() -> String {
    "Lab Order".to_string()
}

fn default_cancellation_reason() -> String {
    "Canceled in OpenELIS".to_string()
}

fn default_form2_prefix() -> String {
    "form2".to_string()
}

fn default_obs_column_prefix() -> String {
    "Obs.".to_string()
}

fn default_date_formats() -> Vec<String> {
    vec!["%Y-%m-%d".to_string(), "%d-%m-%Y".to_string()]
}

fn default_local_path() -> String {
    "/var/log/bahmni-bridge".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::secret_string;

    fn openmrs_config() -> OpenMrsConfig {
        OpenMrsConfig {
            base_url: "https://emr.example.org/openmrs".to_string(),
            username: "superman".to_string(),
            password: secret_string("Admin123".to_string()),
            timeout_seconds: 30,
            tls_verify: true,
        }
    }

    fn base_config() -> BridgeConfig {
        BridgeConfig {
            application: ApplicationConfig::default(),
            environment: Environment::Development,
            store_target: StoreTarget::OpenMrs,
            elis: ElisConfig::default(),
            openmrs: Some(openmrs_config()),
            lab: LabConfig::default(),
            csv: CsvConfig::default(),
            logging: LoggingConfig::default(),
        }
    }

    #[test]
    fn test_application_config_validation() {
        let mut config = ApplicationConfig::default();
        assert!(config.validate().is_ok());

        config.log_level = "verbose".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_base_config_is_valid() {
        assert!(base_config().validate().is_ok());
    }

    #[test]
    fn test_openmrs_section_required() {
        let mut config = base_config();
        config.openmrs = None;
        let err = config.validate().unwrap_err();
        assert!(err.contains("openmrs configuration is required"));

        config.store_target = StoreTarget::Memory;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_memory_store_rejected_in_production() {
        let mut config = base_config();
        config.environment = Environment::Production;
        config.store_target = StoreTarget::Memory;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_elis_base_url_validation() {
        let mut config = base_config();
        config.elis.base_url = "localhost:8052".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.contains("elis.base_url"));
    }

    #[test]
    fn test_tls_verification_in_production() {
        let mut config = base_config();
        config.environment = Environment::Production;
        assert!(config.validate().is_ok());

        config.elis.tls_verify = false;
        assert!(config.validate().unwrap_err().contains("elis.tls_verify"));

        config.elis.tls_verify = true;
        if let Some(ref mut openmrs) = config.openmrs {
            openmrs.tls_verify = false;
        }
        assert!(config.validate().unwrap_err().contains("openmrs.tls_verify"));

        config.environment = Environment::Staging;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_openmrs_credentials_required() {
        let mut openmrs = openmrs_config();
        openmrs.password = secret_string(String::new());
        assert!(openmrs.validate(&Environment::Development).is_err());

        let mut openmrs = openmrs_config();
        openmrs.username = " ".to_string();
        assert!(openmrs.validate(&Environment::Development).is_err());
    }

    #[test]
    fn test_csv_config_validation() {
        let mut csv = CsvConfig::default();
        assert!(csv.validate().is_ok());

        csv.date_formats.clear();
        assert!(csv.validate().is_err());
    }

    #[test]
    fn test_logging_rotation_validation() {
        let mut logging = LoggingConfig::default();
        logging.local_rotation = "weekly".to_string();
        assert!(logging.validate().is_err());
    }

    #[test]
    fn test_default_values() {
        let lab = LabConfig::default();
        assert_eq!(lab.encounter_type, "LAB_RESULT");
        assert_eq!(lab.cancellation_reason, "Canceled in OpenELIS");
        assert_eq!(CsvConfig::default().form2_prefix, "form2");
        assert_eq!(StoreTarget::default(), StoreTarget::OpenMrs);
    }
}
