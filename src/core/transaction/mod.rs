//! Encounter transaction representation of observations
//!
//! - [`observation`] - wire types posted to the encounter transaction endpoint
//! - [`bahmni`] - [`BahmniObservation`], the client-facing view
//! - [`mapper`] - rendering stored encounters as transactions

pub mod bahmni;
pub mod mapper;
pub mod observation;

pub use bahmni::BahmniObservation;
pub use mapper::{encounter_to_transaction, obs_to_et_observation};
pub use observation::{EncounterTransaction, EtConcept, EtObservation};
