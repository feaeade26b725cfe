//! OpenMRS integration
//!
//! - [`traits`] - service traits the workers depend on
//! - [`client`] - REST implementation with Basic authentication
//! - [`memory`] - in-memory implementation for dry runs and tests
//! - [`factory`] - backend selection from configuration

pub mod client;
pub mod factory;
pub mod memory;
pub mod models;
pub mod traits;

pub use client::OpenMrsRestClient;
pub use factory::create_openmrs_services;
pub use memory::InMemoryOpenMrs;
pub use traits::{ConceptService, EncounterService, EncounterTransactionService, OpenMrsServices};
