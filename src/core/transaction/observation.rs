//! Encounter transaction wire types
//!
//! These mirror the JSON accepted by the Bahmni encounter transaction endpoint
//! (`/ws/rest/v1/bahmnicore/bahmniencounter`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Concept as referenced from an encounter transaction
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EtConcept {
    #[serde(default)]
    pub uuid: Option<String>,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub data_type: Option<String>,
}

impl EtConcept {
    pub fn new(uuid: Option<String>, name: impl Into<String>) -> Self {
        Self {
            uuid,
            name: Some(name.into()),
            data_type: None,
        }
    }
}

/// An observation inside an encounter transaction
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EtObservation {
    #[serde(default)]
    pub uuid: Option<String>,

    pub concept: EtConcept,

    #[serde(default)]
    pub value: Option<String>,

    #[serde(default)]
    pub comment: Option<String>,

    #[serde(default)]
    pub observation_date_time: Option<DateTime<Utc>>,

    #[serde(default)]
    pub order_uuid: Option<String>,

    #[serde(default)]
    pub voided: bool,

    #[serde(default)]
    pub void_reason: Option<String>,

    #[serde(default)]
    pub group_members: Vec<EtObservation>,
}

impl EtObservation {
    pub fn new(concept: EtConcept) -> Self {
        Self {
            concept,
            ..Default::default()
        }
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn with_observation_date_time(mut self, date_time: Option<DateTime<Utc>>) -> Self {
        self.observation_date_time = date_time;
        self
    }

    /// Concept name, or the empty string when unnamed
    pub fn concept_name(&self) -> &str {
        self.concept.name.as_deref().unwrap_or_default()
    }
}

/// A set of observations saved as one encounter
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncounterTransaction {
    #[serde(default)]
    pub encounter_uuid: Option<String>,

    #[serde(default)]
    pub patient_uuid: Option<String>,

    /// Used when the patient uuid is not known, e.g. CSV imports
    #[serde(default)]
    pub patient_identifier: Option<String>,

    #[serde(default)]
    pub encounter_type: Option<String>,

    #[serde(default)]
    pub visit_type: Option<String>,

    #[serde(default)]
    pub encounter_date_time: Option<DateTime<Utc>>,

    #[serde(default)]
    pub provider_uuids: Vec<String>,

    #[serde(default)]
    pub observations: Vec<EtObservation>,
}

