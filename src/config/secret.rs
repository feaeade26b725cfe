//! Credential handling for the OpenMRS connection
//!
//! Passwords are held in `secrecy::Secret` so they are zeroized on drop and
//! redacted from `Debug` output. They are only exposed when the Basic
//! authorization header is built.

use base64::{engine::general_purpose, Engine as _};
use secrecy::{CloneableSecret, DebugSecret, ExposeSecret, Secret, SerializableSecret};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use zeroize::Zeroize;

/// String newtype that can live inside a [`Secret`]
#[derive(Clone, Debug, Zeroize)]
#[zeroize(drop)]
pub struct SecretValue(String);

impl CloneableSecret for SecretValue {}
impl DebugSecret for SecretValue {}
impl SerializableSecret for SecretValue {}

impl From<String> for SecretValue {
    fn from(s: String) -> Self {
        SecretValue(s)
    }
}

impl PartialEq<str> for SecretValue {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl AsRef<str> for SecretValue {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl SecretValue {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for SecretValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for SecretValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        String::deserialize(deserializer).map(SecretValue)
    }
}

/// A zeroizing, debug-redacted string
pub type SecretString = Secret<SecretValue>;

/// Wraps a plain string
///
/// ```rust
/// use bahmni_bridge::config::secret_string;
/// use secrecy::ExposeSecret;
///
/// let password = secret_string("Admin123".to_string());
/// assert_eq!(password.expose_secret(), "Admin123");
/// ```
#[inline]
pub fn secret_string(value: String) -> SecretString {
    Secret::new(SecretValue::from(value))
}

/// Builds an HTTP Basic `Authorization` header value
pub fn basic_auth_header(username: &str, password: &SecretString) -> String {
    let credentials = format!("{username}:{}", password.expose_secret().as_ref());
    let encoded = general_purpose::STANDARD.encode(credentials.as_bytes());
    format!("Basic {encoded}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secret_string_creation() {
        let secret = secret_string("test-password".to_string());
        assert_eq!(secret.expose_secret(), "test-password");
    }

    #[test]
    fn test_secret_debug_redacted() {
        let secret = secret_string("sensitive-data".to_string());
        let debug_output = format!("{secret:?}");
        assert!(!debug_output.contains("sensitive-data"));
    }

    #[test]
    fn test_secret_deserialize_from_toml() {
        #[derive(Deserialize)]
        struct Credentials {
            password: SecretString,
        }

        let parsed: Credentials = toml::from_str("password = \"Admin123\"").unwrap();
        assert_eq!(parsed.password.expose_secret(), "Admin123");
    }

    #[test]
    fn test_basic_auth_header() {
        let password = secret_string("Admin123".to_string());
        // base64("superman:Admin123")
        assert_eq!(
            basic_auth_header("superman", &password),
            "Basic c3VwZXJtYW46QWRtaW4xMjM="
        );
    }
}
