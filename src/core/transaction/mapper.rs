//! Domain encounter to encounter transaction mapping

use super::observation::{EncounterTransaction, EtConcept, EtObservation};
use crate::domain::{Encounter, Obs};

/// Renders a stored observation tree as a transaction observation
pub fn obs_to_et_observation(obs: &Obs) -> EtObservation {
    EtObservation {
        uuid: Some(obs.uuid.clone()),
        concept: EtConcept {
            uuid: Some(obs.concept.uuid.clone()),
            name: obs.concept.name.clone(),
            data_type: None,
        },
        value: obs.value_text.clone(),
        comment: obs.comment.clone(),
        observation_date_time: obs.obs_datetime,
        order_uuid: obs.order_uuid.clone(),
        voided: obs.voided,
        void_reason: obs.void_reason.clone(),
        group_members: obs.group_members.iter().map(obs_to_et_observation).collect(),
    }
}

/// Builds the transaction representation of an encounter
///
/// Voided observations are kept and flagged so consumers can tell a result
/// was withdrawn.
pub fn encounter_to_transaction(encounter: &Encounter) -> EncounterTransaction {
    EncounterTransaction {
        encounter_uuid: Some(encounter.uuid.clone()),
        patient_uuid: encounter.patient_uuid.clone(),
        patient_identifier: None,
        encounter_type: Some(encounter.encounter_type.name.clone()),
        visit_type: None,
        encounter_date_time: encounter.encounter_datetime,
        provider_uuids: encounter.provider_uuid.iter().cloned().collect(),
        observations: encounter.obs.iter().map(obs_to_et_observation).collect(),
    }
}
