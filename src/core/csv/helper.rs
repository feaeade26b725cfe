//! Observation helper used by CSV handlers
//!
//! Headers encode the concept path of an observation, e.g. `Vitals.Height`
//! is a `Height` observation inside a `Vitals` group. Form-version 2 headers
//! carry an extra leading prefix (`form2.Vitals.Height`).

use super::row::KeyValue;
use crate::adapters::openmrs::ConceptService;
use crate::core::transaction::{EtConcept, EtObservation};
use crate::domain::{CsvImportError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Header and value operations shared by the CSV observation handlers
#[async_trait]
pub trait ObservationHelper: Send + Sync {
    /// True when the header belongs to a form-version 1 observation
    fn is_form1_type(&self, obs: &KeyValue) -> bool;

    /// True when the header carries the form-version 2 prefix
    fn is_form2_type(&self, obs: &KeyValue) -> bool;

    /// Splits a header into its concept names
    fn get_csv_header_parts(&self, obs: &KeyValue) -> Vec<String>;

    /// Checks a value against the leaf concept when that concept is numeric
    ///
    /// # Errors
    ///
    /// [`CsvImportError`] when the concept is unknown, the value is not a
    /// number or it falls outside the concept's absolute range.
    async fn verify_numeric_concept_value(
        &self,
        obs: &KeyValue,
        concept_names: &[String],
    ) -> Result<()>;

    /// Adds the observation to `observations`, reusing existing group
    /// observations along the concept path
    async fn create_observations(
        &self,
        observations: &mut Vec<EtObservation>,
        encounter_date: Option<DateTime<Utc>>,
        obs: &KeyValue,
        concept_names: &[String],
    ) -> Result<()>;
}

/// [`ObservationHelper`] backed by the OpenMRS concept dictionary
pub struct CsvObservationHelper {
    concepts: Arc<dyn ConceptService>,
    form2_prefix: String,
}

impl CsvObservationHelper {
    pub fn new(concepts: Arc<dyn ConceptService>, form2_prefix: impl Into<String>) -> Self {
        Self {
            concepts,
            form2_prefix: form2_prefix.into(),
        }
    }

    async fn resolve(&self, name: &str) -> Result<EtConcept> {
        let concept = self
            .concepts
            .get_concept_by_name(name)
            .await?
            .ok_or_else(|| CsvImportError::UnknownConcept(name.to_string()))?;

        Ok(EtConcept {
            uuid: Some(concept.uuid),
            name: Some(concept.name),
            data_type: Some(concept.datatype.display().to_string()),
        })
    }
}

#[async_trait]
impl ObservationHelper for CsvObservationHelper {
    fn is_form1_type(&self, obs: &KeyValue) -> bool {
        !self.is_form2_type(obs)
    }

    fn is_form2_type(&self, obs: &KeyValue) -> bool {
        obs.key
            .trim()
            .strip_prefix(self.form2_prefix.as_str())
            .map(|rest| rest.starts_with('.'))
            .unwrap_or(false)
    }

    fn get_csv_header_parts(&self, obs: &KeyValue) -> Vec<String> {
        obs.key
            .split('.')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(str::to_string)
            .collect()
    }

    async fn verify_numeric_concept_value(
        &self,
        obs: &KeyValue,
        concept_names: &[String],
    ) -> Result<()> {
        let Some(leaf) = concept_names.last() else {
            return Err(CsvImportError::Malformed(format!("empty header '{}'", obs.key)).into());
        };

        let concept = self
            .concepts
            .get_concept_by_name(leaf)
            .await?
            .ok_or_else(|| CsvImportError::UnknownConcept(leaf.clone()))?;
        if !concept.is_numeric() {
            return Ok(());
        }

        let value: f64 = obs.value.trim().parse().map_err(|_| CsvImportError::NonNumericValue {
            concept: concept.name.clone(),
            value: obs.value.clone(),
        })?;
        if !concept.within_absolute_range(value) {
            return Err(CsvImportError::OutOfRange {
                concept: concept.name,
                value,
            }
            .into());
        }
        Ok(())
    }

    async fn create_observations(
        &self,
        observations: &mut Vec<EtObservation>,
        encounter_date: Option<DateTime<Utc>>,
        obs: &KeyValue,
        concept_names: &[String],
    ) -> Result<()> {
        if concept_names.is_empty() {
            return Err(CsvImportError::Malformed(format!("empty header '{}'", obs.key)).into());
        }

        let mut path = Vec::with_capacity(concept_names.len());
        for name in concept_names {
            path.push(self.resolve(name).await?);
        }
        insert_observation(observations, &path, obs.value.trim(), encounter_date);
        Ok(())
    }
}

/// Walks `path` down the observation tree, creating missing groups, and
/// appends the leaf with its value
fn insert_observation(
    observations: &mut Vec<EtObservation>,
    path: &[EtConcept],
    value: &str,
    encounter_date: Option<DateTime<Utc>>,
) {
    let Some((leaf, groups)) = path.split_last() else {
        return;
    };

    let mut level = observations;
    for group in groups {
        let index = match level
            .iter()
            .position(|obs| !obs.voided && obs.concept.uuid == group.uuid)
        {
            Some(index) => index,
            None => {
                level.push(
                    EtObservation::new(group.clone()).with_observation_date_time(encounter_date),
                );
                level.len() - 1
            }
        };
        level = &mut level[index].group_members;
    }

    level.push(
        EtObservation::new(leaf.clone())
            .with_value(value)
            .with_observation_date_time(encounter_date),
    );
}
