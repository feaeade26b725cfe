//! Encounter aggregate as persisted by OpenMRS
//!
//! Only the parts the bridge reads or writes are modelled: the encounter
//! header, its test orders and its observations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Reference to a concept by uuid, with the display name when known
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConceptRef {
    pub uuid: String,

    #[serde(default)]
    pub name: Option<String>,
}

impl ConceptRef {
    pub fn new(uuid: impl Into<String>) -> Self {
        Self {
            uuid: uuid.into(),
            name: None,
        }
    }

    pub fn named(uuid: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            uuid: uuid.into(),
            name: Some(name.into()),
        }
    }
}

/// Encounter type, matched by name when uuid is unknown
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncounterType {
    #[serde(default)]
    pub uuid: Option<String>,

    pub name: String,
}

impl EncounterType {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            uuid: None,
            name: name.into(),
        }
    }
}

/// A lab test order attached to an encounter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestOrder {
    pub uuid: String,

    pub concept: ConceptRef,

    #[serde(default)]
    pub order_type: Option<String>,

    #[serde(default)]
    pub accession_number: Option<String>,

    #[serde(default)]
    pub date_activated: Option<DateTime<Utc>>,

    #[serde(default)]
    pub voided: bool,

    #[serde(default)]
    pub void_reason: Option<String>,
}

impl TestOrder {
    /// Creates an active order with a fresh uuid
    pub fn new(concept: ConceptRef) -> Self {
        Self {
            uuid: uuid::Uuid::new_v4().to_string(),
            concept,
            order_type: None,
            accession_number: None,
            date_activated: None,
            voided: false,
            void_reason: None,
        }
    }

    /// Marks the order voided
    pub fn void(&mut self, reason: &str) {
        self.voided = true;
        self.void_reason = Some(reason.to_string());
    }
}

/// A single observation, possibly an obs group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Obs {
    pub uuid: String,

    pub concept: ConceptRef,

    #[serde(default)]
    pub value_text: Option<String>,

    #[serde(default)]
    pub obs_datetime: Option<DateTime<Utc>>,

    #[serde(default)]
    pub comment: Option<String>,

    /// Order this observation reports on
    #[serde(default)]
    pub order_uuid: Option<String>,

    #[serde(default)]
    pub group_members: Vec<Obs>,

    #[serde(default)]
    pub voided: bool,

    #[serde(default)]
    pub void_reason: Option<String>,
}

impl Obs {
    /// Creates an empty observation with a fresh uuid
    pub fn new(concept: ConceptRef) -> Self {
        Self {
            uuid: uuid::Uuid::new_v4().to_string(),
            concept,
            value_text: None,
            obs_datetime: None,
            comment: None,
            order_uuid: None,
            group_members: Vec::new(),
            voided: false,
            void_reason: None,
        }
    }

    pub fn add_group_member(&mut self, member: Obs) {
        self.group_members.push(member);
    }

    /// Voids this observation and every group member below it
    pub fn void(&mut self, reason: &str) {
        self.voided = true;
        self.void_reason = Some(reason.to_string());
        for member in &mut self.group_members {
            member.void(reason);
        }
    }
}

/// Clinical encounter holding lab orders and results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Encounter {
    pub uuid: String,

    pub encounter_type: EncounterType,

    #[serde(default)]
    pub patient_uuid: Option<String>,

    #[serde(default)]
    pub encounter_datetime: Option<DateTime<Utc>>,

    #[serde(default)]
    pub provider_uuid: Option<String>,

    #[serde(default)]
    pub orders: Vec<TestOrder>,

    #[serde(default)]
    pub obs: Vec<Obs>,

    #[serde(default)]
    pub voided: bool,
}

impl Encounter {
    /// Creates an empty encounter
    pub fn new(uuid: impl Into<String>, encounter_type: EncounterType) -> Self {
        Self {
            uuid: uuid.into(),
            encounter_type,
            patient_uuid: None,
            encounter_datetime: None,
            provider_uuid: None,
            orders: Vec::new(),
            obs: Vec::new(),
            voided: false,
        }
    }

    pub fn add_order(&mut self, order: TestOrder) {
        self.orders.push(order);
    }

    pub fn add_obs(&mut self, obs: Obs) {
        self.obs.push(obs);
    }

    /// Orders that have not been voided
    pub fn active_orders(&self) -> impl Iterator<Item = &TestOrder> {
        self.orders.iter().filter(|order| !order.voided)
    }

    /// True if a non-voided order exists for the concept
    pub fn has_active_order_for(&self, concept_uuid: &str) -> bool {
        self.active_orders()
            .any(|order| order.concept.uuid == concept_uuid)
    }

    /// Voids every active order for the concept along with the observations
    /// recorded against those orders. Returns the number of orders voided.
    pub fn void_orders_for(&mut self, concept_uuid: &str, reason: &str) -> usize {
        let mut voided_order_uuids = Vec::new();
        for order in self
            .orders
            .iter_mut()
            .filter(|order| !order.voided && order.concept.uuid == concept_uuid)
        {
            order.void(reason);
            voided_order_uuids.push(order.uuid.clone());
        }

        for obs in self.obs.iter_mut().filter(|obs| !obs.voided) {
            let linked = obs
                .order_uuid
                .as_ref()
                .map(|uuid| voided_order_uuids.contains(uuid))
                .unwrap_or(false);
            if linked || obs.concept.uuid == concept_uuid {
                obs.void(reason);
            }
        }

        voided_order_uuids.len()
    }
}
