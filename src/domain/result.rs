//! Result type alias for the bridge

use super::errors::BridgeError;

/// Result type alias using [`BridgeError`]
///
/// ```
/// use bahmni_bridge::domain::result::Result;
/// use bahmni_bridge::domain::errors::BridgeError;
///
/// fn failing() -> Result<()> {
///     Err(BridgeError::Validation("accession uuid is blank".to_string()))
/// }
/// assert!(failing().is_err());
/// ```
pub type Result<T> = std::result::Result<T, BridgeError>;
