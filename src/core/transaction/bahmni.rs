//! Bahmni view of an observation

use super::observation::{EtConcept, EtObservation};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Observation as displayed by Bahmni clients
///
/// Carries the same data as [`EtObservation`] plus the date-time of the
/// encounter it was recorded in.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BahmniObservation {
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
    pub encounter_date_time: Option<DateTime<Utc>>,

    #[serde(default)]
    pub order_uuid: Option<String>,

    #[serde(default)]
    pub voided: bool,

    #[serde(default)]
    pub void_reason: Option<String>,

    #[serde(default)]
    pub group_members: Vec<BahmniObservation>,
}

impl BahmniObservation {
    /// Maps a transaction observation, recursing into group members
    pub fn from_et(observation: &EtObservation, encounter_date_time: Option<DateTime<Utc>>) -> Self {
        Self {
            uuid: observation.uuid.clone(),
            concept: observation.concept.clone(),
            value: observation.value.clone(),
            comment: observation.comment.clone(),
            observation_date_time: observation.observation_date_time,
            encounter_date_time,
            order_uuid: observation.order_uuid.clone(),
            voided: observation.voided,
            void_reason: observation.void_reason.clone(),
            group_members: observation
                .group_members
                .iter()
                .map(|member| Self::from_et(member, encounter_date_time))
                .collect(),
        }
    }

    /// Maps a list of transaction observations recorded in one encounter
    pub fn from_et_list(
        observations: &[EtObservation],
        encounter_date_time: Option<DateTime<Utc>>,
    ) -> Vec<Self> {
        observations
            .iter()
            .map(|observation| Self::from_et(observation, encounter_date_time))
            .collect()
    }

    /// Converts back into the transaction representation
    pub fn to_et_observation(&self) -> EtObservation {
        EtObservation {
            uuid: self.uuid.clone(),
            concept: self.concept.clone(),
            value: self.value.clone(),
            comment: self.comment.clone(),
            observation_date_time: self.observation_date_time,
            order_uuid: self.order_uuid.clone(),
            voided: self.voided,
            void_reason: self.void_reason.clone(),
            group_members: self
                .group_members
                .iter()
                .map(BahmniObservation::to_et_observation)
                .collect(),
        }
    }

    /// Two observations are the same when their uuids match
    pub fn is_same_as(&self, observation: &EtObservation) -> bool {
        matches!((&self.uuid, &observation.uuid), (Some(mine), Some(theirs)) if mine == theirs)
    }

    pub fn add_group_member(&mut self, member: BahmniObservation) {
        self.group_members.push(member);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_same_as_compares_uuid() {
        let bahmni = BahmniObservation {
            uuid: Some("uuid".to_string()),
            ..Default::default()
        };
        let mut et = EtObservation {
            uuid: Some("uuid".to_string()),
            ..Default::default()
        };
        assert!(bahmni.is_same_as(&et));

        et.uuid = Some("other".to_string());
        assert!(!bahmni.is_same_as(&et));
    }

    #[test]
    fn test_missing_uuids_are_never_same() {
        let bahmni = BahmniObservation::default();
        assert!(!bahmni.is_same_as(&EtObservation::default()));
    }

    #[test]
    fn test_encounter_date_time_reaches_members() {
        let encounter_date = Utc::now();
        let mut parent = EtObservation::new(EtConcept::new(Some("c".to_string()), "Vitals"));
        parent
            .group_members
            .push(EtObservation::new(EtConcept::new(Some("p".to_string()), "Pulse")));

        let mapped = BahmniObservation::from_et(&parent, Some(encounter_date));
        assert_eq!(mapped.group_members[0].encounter_date_time, Some(encounter_date));
    }
}
