//! In-memory OpenMRS backend
//!
//! Used for dry runs and as the test double for workers. Counts lookups and
//! saves so callers can assert on interaction counts.

use super::traits::{ConceptService, EncounterService, EncounterTransactionService};
use crate::core::transaction::EncounterTransaction;
use crate::domain::{Concept, Encounter, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Mutex;

#[derive(Default)]
pub struct InMemoryOpenMrs {
    encounters: Mutex<HashMap<String, Encounter>>,
    concepts: Mutex<HashMap<String, Concept>>,
    transactions: Mutex<Vec<EncounterTransaction>>,
    encounter_lookups: AtomicUsize,
    encounter_saves: AtomicUsize,
    concept_saves: AtomicUsize,
}

impl InMemoryOpenMrs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds an encounter without counting it as a save
    pub async fn insert_encounter(&self, encounter: Encounter) {
        self.encounters
            .lock()
            .await
            .insert(encounter.uuid.clone(), encounter);
    }

    /// Seeds a concept without counting it as a save
    pub async fn insert_concept(&self, concept: Concept) {
        self.concepts
            .lock()
            .await
            .insert(concept.uuid.clone(), concept);
    }

    pub async fn encounter(&self, uuid: &str) -> Option<Encounter> {
        self.encounters.lock().await.get(uuid).cloned()
    }

    pub async fn concept(&self, uuid: &str) -> Option<Concept> {
        self.concepts.lock().await.get(uuid).cloned()
    }

    pub async fn saved_transactions(&self) -> Vec<EncounterTransaction> {
        self.transactions.lock().await.clone()
    }

    pub fn encounter_lookups(&self) -> usize {
        self.encounter_lookups.load(Ordering::SeqCst)
    }

    pub fn encounter_saves(&self) -> usize {
        self.encounter_saves.load(Ordering::SeqCst)
    }

    pub fn concept_saves(&self) -> usize {
        self.concept_saves.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EncounterService for InMemoryOpenMrs {
    async fn get_encounter_by_uuid(&self, uuid: &str) -> Result<Option<Encounter>> {
        self.encounter_lookups.fetch_add(1, Ordering::SeqCst);
        Ok(self.encounters.lock().await.get(uuid).cloned())
    }

    async fn save_encounter(&self, encounter: &Encounter) -> Result<Encounter> {
        self.encounter_saves.fetch_add(1, Ordering::SeqCst);
        self.encounters
            .lock()
            .await
            .insert(encounter.uuid.clone(), encounter.clone());
        Ok(encounter.clone())
    }
}

#[async_trait]
impl ConceptService for InMemoryOpenMrs {
    async fn get_concept_by_uuid(&self, uuid: &str) -> Result<Option<Concept>> {
        Ok(self.concepts.lock().await.get(uuid).cloned())
    }

    async fn get_concept_by_name(&self, name: &str) -> Result<Option<Concept>> {
        Ok(self
            .concepts
            .lock()
            .await
            .values()
            .find(|concept| !concept.retired && concept.name.eq_ignore_ascii_case(name))
            .cloned())
    }

    async fn save_concept(&self, concept: &Concept) -> Result<Concept> {
        self.concept_saves.fetch_add(1, Ordering::SeqCst);
        self.concepts
            .lock()
            .await
            .insert(concept.uuid.clone(), concept.clone());
        Ok(concept.clone())
    }
}

#[async_trait]
impl EncounterTransactionService for InMemoryOpenMrs {
    async fn save_transaction(&self, transaction: &EncounterTransaction) -> Result<String> {
        let encounter_uuid = transaction
            .encounter_uuid
            .clone()
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

        let mut stored = transaction.clone();
        stored.encounter_uuid = Some(encounter_uuid.clone());
        self.transactions.lock().await.push(stored);
        Ok(encounter_uuid)
    }
}
