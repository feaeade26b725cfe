// Bahmni Bridge - OpenELIS and CSV integration for OpenMRS
// Copyright (c) 2025 Bahmni Bridge Contributors
// Licensed under the MIT License

//! # Bahmni Bridge
//!
//! Integration glue between the OpenELIS lab system and OpenMRS, as used by
//! Bahmni deployments.
//!
//! ## Overview
//!
//! - **Accession sync**: each OpenELIS accession event creates or updates the
//!   lab encounter of the same uuid, adding orders for new tests, voiding
//!   orders for canceled ones and recording results
//! - **Lab test sync**: OpenELIS test definitions are mirrored as concepts
//! - **CSV import**: encounter spreadsheets become Bahmni encounter
//!   transactions, with form-version 1 observation headers resolved against
//!   the concept dictionary
//! - **Observation mapping**: `BahmniObservation` to and from encounter
//!   transaction observations
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Workers, mappers and the CSV importer
//! - [`adapters`] - OpenELIS and OpenMRS clients, plus an in-memory store
//! - [`domain`] - Domain types and errors
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use bahmni_bridge::adapters::openmrs::create_openmrs_services;
//! use bahmni_bridge::config::load_config;
//! use bahmni_bridge::core::csv::{CsvObservationHelper, EncounterCsvImporter, Form1CsvObsHandler};
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config("bahmni-bridge.toml")?;
//!     let services = create_openmrs_services(&config)?;
//!
//!     let helper = Arc::new(CsvObservationHelper::new(
//!         services.concepts.clone(),
//!         config.csv.form2_prefix.as_str(),
//!     ));
//!     let handler = Arc::new(Form1CsvObsHandler::new(helper, config.csv.date_formats.clone()));
//!     let importer = EncounterCsvImporter::new(handler, services.transactions, config.csv);
//!
//!     let summary = importer.import_file(Path::new("encounters.csv")).await?;
//!     println!("Imported {} of {} rows", summary.rows_imported, summary.rows_total);
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! Library functions return [`domain::Result`], whose error is
//! [`domain::BridgeError`]. The CLI maps errors to exit codes.
//!
//! ## Logging
//!
//! ```rust,no_run
//! use bahmni_bridge::config::LoggingConfig;
//! use bahmni_bridge::logging::init_logging;
//!
//! let _guard = init_logging("info", &LoggingConfig::default()).expect("logging");
//! tracing::info!(accession_uuid = "abc", "Processing accession");
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
