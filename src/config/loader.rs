//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::{BridgeConfig, OpenMrsConfig, StoreTarget};
use super::secret::secret_string;
use crate::domain::errors::BridgeError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (`${VAR}` syntax)
/// 3. Parses the TOML into [`BridgeConfig`]
/// 4. Applies environment variable overrides (`BAHMNI_*` prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns [`BridgeError::Configuration`] if the file is missing or unreadable,
/// a referenced environment variable is unset, the TOML is malformed or
/// validation fails.
///
/// # Examples
///
/// ```no_run
/// use bahmni_bridge::config::loader::load_config;
///
/// let config = load_config("bahmni-bridge.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<BridgeConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(BridgeError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        BridgeError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    let contents = substitute_env_vars(&contents)?;

    let mut config: BridgeConfig = toml::from_str(&contents)
        .map_err(|e| BridgeError::Configuration(format!("Failed to parse TOML: {e}")))?;

    apply_env_overrides(&mut config)?;

    config.validate().map_err(|e| {
        BridgeError::Configuration(format!("Configuration validation failed: {e}"))
    })?;

    Ok(config)
}

/// Substitutes environment variables in the format `${VAR_NAME}`
///
/// Comment lines are copied untouched.
///
/// # Errors
///
/// Returns an error listing every referenced variable that is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| BridgeError::Configuration(format!("Invalid substitution pattern: {e}")))?;
    let mut lines = Vec::new();
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            lines.push(line.to_string());
            continue;
        }

        let processed = re.replace_all(line, |caps: &regex::Captures| {
            let var_name = &caps[1];
            match std::env::var(var_name) {
                Ok(value) => value,
                Err(_) => {
                    if !missing_vars.iter().any(|name| name == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                    caps[0].to_string()
                }
            }
        });
        lines.push(processed.into_owned());
    }

    if !missing_vars.is_empty() {
        return Err(BridgeError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(lines.join("\n"))
}

fn env(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

fn env_parsed<T: std::str::FromStr>(name: &str) -> Option<T> {
    env(name).and_then(|val| val.parse().ok())
}

/// Applies environment variable overrides using the `BAHMNI_*` prefix
///
/// Variables follow the pattern `BAHMNI_<SECTION>_<KEY>`, for example
/// `BAHMNI_ELIS_BASE_URL` or `BAHMNI_OPENMRS_PASSWORD`.
fn apply_env_overrides(config: &mut BridgeConfig) -> Result<()> {
    if let Some(val) = env("BAHMNI_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }
    if let Some(val) = env_parsed("BAHMNI_APPLICATION_DRY_RUN") {
        config.application.dry_run = val;
    }
    if let Some(val) = env("BAHMNI_STORE_TARGET") {
        config.store_target = match val.to_lowercase().as_str() {
            "openmrs" => StoreTarget::OpenMrs,
            "memory" => StoreTarget::Memory,
            other => {
                return Err(BridgeError::Configuration(format!(
                    "Invalid BAHMNI_STORE_TARGET '{other}'. Must be one of: openmrs, memory"
                )))
            }
        };
    }

    if let Some(val) = env("BAHMNI_ELIS_BASE_URL") {
        config.elis.base_url = val;
    }
    if let Some(val) = env_parsed("BAHMNI_ELIS_TIMEOUT_SECONDS") {
        config.elis.timeout_seconds = val;
    }
    if let Some(val) = env_parsed("BAHMNI_ELIS_TLS_VERIFY") {
        config.elis.tls_verify = val;
    }

    // A complete OpenMRS section can be supplied purely through the environment
    if config.openmrs.is_none() {
        if let (Some(base_url), Some(username), Some(password)) = (
            env("BAHMNI_OPENMRS_BASE_URL"),
            env("BAHMNI_OPENMRS_USERNAME"),
            env("BAHMNI_OPENMRS_PASSWORD"),
        ) {
            config.openmrs = Some(OpenMrsConfig {
                base_url,
                username,
                password: secret_string(password),
                timeout_seconds: 60,
                tls_verify: true,
            });
        }
    }
    if let Some(ref mut openmrs) = config.openmrs {
        if let Some(val) = env("BAHMNI_OPENMRS_BASE_URL") {
            openmrs.base_url = val;
        }
        if let Some(val) = env("BAHMNI_OPENMRS_USERNAME") {
            openmrs.username = val;
        }
        if let Some(val) = env("BAHMNI_OPENMRS_PASSWORD") {
            openmrs.password = secret_string(val);
        }
        if let Some(val) = env_parsed("BAHMNI_OPENMRS_TIMEOUT_SECONDS") {
            openmrs.timeout_seconds = val;
        }
        if let Some(val) = env_parsed("BAHMNI_OPENMRS_TLS_VERIFY") {
            openmrs.tls_verify = val;
        }
    }

    if let Some(val) = env("BAHMNI_LAB_ENCOUNTER_TYPE") {
        config.lab.encounter_type = val;
    }
    if let Some(val) = env("BAHMNI_LAB_ORDER_TYPE") {
        config.lab.order_type = val;
    }
    if let Some(val) = env("BAHMNI_LAB_SYSTEM_PROVIDER_UUID") {
        config.lab.lab_system_provider_uuid = Some(val);
    }
    if let Some(val) = env("BAHMNI_LAB_CANCELLATION_REASON") {
        config.lab.cancellation_reason = val;
    }

    if let Some(val) = env("BAHMNI_CSV_FORM2_PREFIX") {
        config.csv.form2_prefix = val;
    }

    if let Some(val) = env_parsed("BAHMNI_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = val;
    }
    if let Some(val) = env("BAHMNI_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_substitute_env_vars() {
        std::env::set_var("BRIDGE_LOADER_TEST_VAR", "test_value");
        let input = "password = \"${BRIDGE_LOADER_TEST_VAR}\"";
        let result = substitute_env_vars(input).unwrap();
        assert_eq!(result, "password = \"test_value\"");
        std::env::remove_var("BRIDGE_LOADER_TEST_VAR");
    }

    #[test]
    fn test_substitute_env_vars_missing() {
        std::env::remove_var("BRIDGE_LOADER_MISSING_VAR");
        let input = "password = \"${BRIDGE_LOADER_MISSING_VAR}\"";
        let err = substitute_env_vars(input).unwrap_err();
        assert!(err.to_string().contains("BRIDGE_LOADER_MISSING_VAR"));
    }

    #[test]
    fn test_substitute_env_vars_skips_comments() {
        std::env::remove_var("BRIDGE_LOADER_COMMENTED_VAR");
        let input = "# password = \"${BRIDGE_LOADER_COMMENTED_VAR}\"\nname = \"x\"";
        let result = substitute_env_vars(input).unwrap();
        assert!(result.contains("${BRIDGE_LOADER_COMMENTED_VAR}"));
    }

    #[test]
    fn test_load_config_missing_file() {
        let result = load_config("nonexistent.toml");
        assert!(matches!(result, Err(BridgeError::Configuration(_))));
    }

    #[test]
    fn test_load_config_valid() {
        let toml_content = r#"
store_target = "memory"

[application]
log_level = "debug"

[elis]
base_url = "http://openelis.local:8052"

[lab]
lab_system_provider_uuid = "provider-1"
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let config = load_config(temp_file.path()).unwrap();
        assert_eq!(config.application.log_level, "debug");
        assert_eq!(config.store_target, StoreTarget::Memory);
        assert_eq!(config.lab.encounter_type, "LAB_RESULT");
        assert_eq!(
            config.lab.lab_system_provider_uuid.as_deref(),
            Some("provider-1")
        );
    }
}
