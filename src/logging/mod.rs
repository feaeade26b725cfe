//! Logging and observability
//!
//! Structured logging via `tracing`: human-readable console output plus an
//! optional JSON file log with rotation.

pub mod structured;

pub use structured::{init_logging, LoggingGuard};

/// Logs the start of feed event processing
///
/// # Example
///
/// ```no_run
/// use bahmni_bridge::log_event_start;
///
/// log_event_start!("accession", "42", "/openelis/ws/rest/accession/abc");
/// ```
#[macro_export]
macro_rules! log_event_start {
    ($kind:expr, $event_id:expr, $content:expr) => {
        tracing::info!(
            kind = $kind,
            event_id = %$event_id,
            content = %$content,
            "Processing feed event"
        );
    };
}

/// Logs an error with context
///
/// # Example
///
/// ```no_run
/// use bahmni_bridge::log_error_with_context;
/// use bahmni_bridge::domain::BridgeError;
///
/// let error = BridgeError::Configuration("Invalid config".to_string());
/// log_error_with_context!(&error, "Failed to load configuration");
/// ```
#[macro_export]
macro_rules! log_error_with_context {
    ($error:expr, $context:expr) => {
        tracing::error!(
            error = %$error,
            context = $context,
            "Error occurred"
        );
    };
}
