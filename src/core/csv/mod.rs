//! Encounter CSV import
//!
//! - [`row`] - parsed rows and their `header -> value` pairs
//! - [`helper`] - concept lookup, numeric checks and observation trees
//! - [`handler`] - form-version 1 observation handling
//! - [`importer`] - reading files and saving encounter transactions
//! - [`summary`] - per-import counts and row errors

pub mod handler;
pub mod helper;
pub mod importer;
pub mod row;
pub mod summary;

pub use handler::{CsvObsHandler, Form1CsvObsHandler};
pub use helper::{CsvObservationHelper, ObservationHelper};
pub use importer::{read_rows, EncounterCsvImporter};
pub use row::{EncounterRow, KeyValue};
pub use summary::ImportSummary;
