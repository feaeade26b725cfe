//! OpenMRS service traits
//!
//! Workers depend on these traits only. The REST client and the in-memory
//! store both implement all three.

use crate::core::transaction::EncounterTransaction;
use crate::domain::{Concept, Encounter, Result};
use async_trait::async_trait;
use std::sync::Arc;

/// Encounter persistence
#[async_trait]
pub trait EncounterService: Send + Sync {
    /// Looks up an encounter by uuid
    ///
    /// # Returns
    ///
    /// `Ok(None)` when no encounter with that uuid exists.
    async fn get_encounter_by_uuid(&self, uuid: &str) -> Result<Option<Encounter>>;

    /// Creates or updates an encounter, keyed by its uuid
    ///
    /// # Errors
    ///
    /// Returns an error if OpenMRS rejects the encounter or is unreachable.
    async fn save_encounter(&self, encounter: &Encounter) -> Result<Encounter>;
}

/// Concept dictionary access
#[async_trait]
pub trait ConceptService: Send + Sync {
    async fn get_concept_by_uuid(&self, uuid: &str) -> Result<Option<Concept>>;

    /// Finds a non-retired concept whose name matches, ignoring case
    async fn get_concept_by_name(&self, name: &str) -> Result<Option<Concept>>;

    async fn save_concept(&self, concept: &Concept) -> Result<Concept>;
}

/// Bahmni encounter transaction endpoint
#[async_trait]
pub trait EncounterTransactionService: Send + Sync {
    /// Saves the transaction and returns the uuid of the encounter it landed in
    async fn save_transaction(&self, transaction: &EncounterTransaction) -> Result<String>;
}

/// The OpenMRS services a worker or importer needs, shared behind `Arc`
#[derive(Clone)]
pub struct OpenMrsServices {
    pub encounters: Arc<dyn EncounterService>,
    pub concepts: Arc<dyn ConceptService>,
    pub transactions: Arc<dyn EncounterTransactionService>,
}

impl OpenMrsServices {
    /// Uses one backend for all three services
    pub fn from_backend<B>(backend: Arc<B>) -> Self
    where
        B: EncounterService + ConceptService + EncounterTransactionService + 'static,
    {
        Self {
            encounters: backend.clone(),
            concepts: backend.clone(),
            transactions: backend,
        }
    }
}
