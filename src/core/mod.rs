//! Core business logic for the bridge.
//!
//! # Modules
//!
//! - [`accession`] - OpenELIS accession events to OpenMRS lab encounters
//! - [`reference`] - OpenELIS lab test definitions to OpenMRS concepts
//! - [`csv`] - encounter CSV import as Bahmni encounter transactions
//! - [`transaction`] - encounter transaction and `BahmniObservation` mapping
//!
//! # Accession workflow
//!
//! 1. **Fetch**: read the accession named by the feed event from OpenELIS
//! 2. **Look up**: find the encounter whose uuid is the accession uuid
//! 3. **Map**: build a new encounter, or diff tests against active orders
//! 4. **Save**: persist only when something changed
//! 5. **Results**: re-read the encounter and record any new test results
//!
//! # Example
//!
//! ```rust,no_run
//! use bahmni_bridge::adapters::elis::OpenElisClient;
//! use bahmni_bridge::adapters::openmrs::create_openmrs_services;
//! use bahmni_bridge::config::load_config;
//! use bahmni_bridge::core::accession::{AccessionEventWorker, AccessionMapper};
//! use bahmni_bridge::domain::FeedEvent;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("bahmni-bridge.toml")?;
//! let services = create_openmrs_services(&config)?;
//! let elis = Arc::new(OpenElisClient::new(&config.elis)?);
//!
//! let worker = AccessionEventWorker::new(
//!     elis,
//!     services.encounters.clone(),
//!     AccessionMapper::new(config.lab.clone()),
//! );
//!
//! let event = FeedEvent::new(
//!     "1",
//!     "/openelis/ws/rest/accession/6d0af4f6-1b8c-4d5e-9d0c-1d8b6e1b8f1a",
//!     "Accession",
//!     "http://localhost:8052/openelis/ws/feed/patient/recent",
//! );
//! let processed = worker.process(&event).await?;
//! println!("{:?}", processed.outcome);
//! # Ok(())
//! # }
//! ```

pub mod accession;
pub mod csv;
pub mod reference;
pub mod transaction;
