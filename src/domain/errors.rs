//! Domain error types
//!
//! The error hierarchy is split by the system the failure came from. Sub-enums
//! never expose third-party types (reqwest, csv) so callers can match on them
//! without pulling in transport crates.

use thiserror::Error;

/// Main error type for the bridge
#[derive(Debug, Error)]
pub enum BridgeError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// OpenELIS (lab system) errors
    #[error("OpenELIS error: {0}")]
    Elis(#[from] ElisError),

    /// OpenMRS service errors
    #[error("OpenMRS error: {0}")]
    OpenMrs(#[from] OpenMrsError),

    /// CSV import errors
    #[error("CSV import error: {0}")]
    CsvImport(#[from] CsvImportError),

    /// Accession or lab test could not be mapped onto OpenMRS objects
    #[error("Mapping error: {0}")]
    Mapping(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

/// Errors raised while talking to OpenELIS
#[derive(Debug, Error)]
pub enum ElisError {
    /// Failed to connect to the OpenELIS server
    #[error("Failed to connect to OpenELIS: {0}")]
    ConnectionFailed(String),

    /// Server error (5xx)
    #[error("Server error: {status} - {message}")]
    ServerError { status: u16, message: String },

    /// Client error (4xx)
    #[error("Client error: {status} - {message}")]
    ClientError { status: u16, message: String },

    /// Response body could not be decoded
    #[error("Invalid response from OpenELIS: {0}")]
    InvalidResponse(String),

    /// Timeout
    #[error("Request timeout: {0}")]
    Timeout(String),
}

/// Errors raised by OpenMRS services
#[derive(Debug, Error)]
pub enum OpenMrsError {
    /// Failed to connect to the OpenMRS server
    #[error("Failed to connect to OpenMRS: {0}")]
    ConnectionFailed(String),

    /// Authentication rejected
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Server error (5xx)
    #[error("Server error: {status} - {message}")]
    ServerError { status: u16, message: String },

    /// Client error (4xx other than 401/404)
    #[error("Client error: {status} - {message}")]
    ClientError { status: u16, message: String },

    /// Response body could not be decoded
    #[error("Invalid response from OpenMRS: {0}")]
    InvalidResponse(String),

    /// Save was rejected
    #[error("Failed to save {resource}: {message}")]
    SaveFailed { resource: String, message: String },
}

/// Errors raised while importing a CSV row
#[derive(Debug, Error, PartialEq)]
pub enum CsvImportError {
    /// Encounter date could not be parsed with any configured format
    #[error("Unparseable encounter date '{value}'")]
    InvalidDate { value: String },

    /// A numeric concept received a non-numeric value
    #[error("Invalid value '{value}' for numeric concept '{concept}'")]
    NonNumericValue { concept: String, value: String },

    /// A numeric value fell outside the concept's absolute range
    #[error("Value {value} for concept '{concept}' is outside the absolute range")]
    OutOfRange { concept: String, value: f64 },

    /// The header names a concept OpenMRS does not know
    #[error("Concept '{0}' not found")]
    UnknownConcept(String),

    /// A required column is missing from the file
    #[error("Missing required column '{0}'")]
    MissingColumn(String),

    /// The file itself could not be read
    #[error("Malformed CSV: {0}")]
    Malformed(String),
}

/// Detail of a single failed CSV row
#[derive(Debug, Clone)]
pub struct RowErrorDetail {
    /// 1-based data row number (header excluded)
    pub row_number: usize,

    /// Patient identifier of the row, if present
    pub patient_identifier: Option<String>,

    /// Error message
    pub message: String,
}

impl RowErrorDetail {
    /// Creates a new row error detail
    pub fn new(row_number: usize, message: impl Into<String>) -> Self {
        Self {
            row_number,
            patient_identifier: None,
            message: message.into(),
        }
    }

    /// Sets the patient identifier
    pub fn with_patient_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.patient_identifier = Some(identifier.into());
        self
    }
}

impl From<std::io::Error> for BridgeError {
    fn from(err: std::io::Error) -> Self {
        BridgeError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for BridgeError {
    fn from(err: serde_json::Error) -> Self {
        BridgeError::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for BridgeError {
    fn from(err: toml::de::Error) -> Self {
        BridgeError::Configuration(format!("TOML parse error: {err}"))
    }
}

impl From<csv::Error> for BridgeError {
    fn from(err: csv::Error) -> Self {
        BridgeError::CsvImport(CsvImportError::Malformed(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bridge_error_display() {
        let err = BridgeError::Configuration("Invalid config".to_string());
        assert_eq!(err.to_string(), "Configuration error: Invalid config");
    }

    #[test]
    fn test_elis_error_conversion() {
        let elis_err = ElisError::ConnectionFailed("refused".to_string());
        let err: BridgeError = elis_err.into();
        assert!(matches!(err, BridgeError::Elis(_)));
        assert!(err.to_string().contains("refused"));
    }

    #[test]
    fn test_csv_error_conversion() {
        let csv_err = CsvImportError::InvalidDate {
            value: "11/31/x".to_string(),
        };
        let err: BridgeError = csv_err.into();
        assert!(matches!(
            err,
            BridgeError::CsvImport(CsvImportError::InvalidDate { .. })
        ));
    }

    #[test]
    fn test_row_error_detail_builder() {
        let detail = RowErrorDetail::new(3, "boom").with_patient_identifier("GAN200000");
        assert_eq!(detail.row_number, 3);
        assert_eq!(detail.patient_identifier.as_deref(), Some("GAN200000"));
        assert_eq!(detail.message, "boom");
    }

    #[test]
    fn test_serde_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: BridgeError = json_err.into();
        assert!(matches!(err, BridgeError::Serialization(_)));
    }

    #[test]
    fn test_toml_error_conversion() {
        let toml_err = toml::from_str::<toml::Value>("a = = b").unwrap_err();
        let err: BridgeError = toml_err.into();
        assert!(err.to_string().contains("TOML parse error"));
    }
}
