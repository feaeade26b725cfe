//! OpenMRS REST wire models
//!
//! Response types are read with `v=full` and converted into domain types.
//! Request bodies are built as JSON values because OpenMRS expects references
//! as bare uuids or names rather than nested objects.

use crate::domain::{
    parse_elis_date_time, Concept, ConceptDatatype, ConceptRef, Encounter, EncounterType, Obs,
    TestOrder,
};
use serde::Deserialize;
use serde_json::{json, Value};

/// `{uuid, display}` reference
#[derive(Debug, Clone, Deserialize)]
pub struct RestRef {
    pub uuid: String,

    #[serde(default)]
    pub display: Option<String>,
}

/// Search response wrapper
#[derive(Debug, Deserialize)]
pub struct RestResults<T> {
    #[serde(default = "Vec::new")]
    pub results: Vec<T>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestEncounterProvider {
    #[serde(default)]
    pub provider: Option<RestRef>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestOrder {
    pub uuid: String,
    pub concept: RestRef,

    #[serde(default)]
    pub order_type: Option<RestRef>,

    #[serde(default)]
    pub accession_number: Option<String>,

    #[serde(default)]
    pub date_activated: Option<String>,

    #[serde(default)]
    pub voided: bool,

    #[serde(default)]
    pub void_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestObs {
    pub uuid: String,
    pub concept: RestRef,

    /// String, number or coded `{uuid, display}`
    #[serde(default)]
    pub value: Option<Value>,

    #[serde(default)]
    pub obs_datetime: Option<String>,

    #[serde(default)]
    pub comment: Option<String>,

    #[serde(default)]
    pub order: Option<RestRef>,

    /// OpenMRS sends `null` for leaf observations
    #[serde(default)]
    pub group_members: Option<Vec<RestObs>>,

    #[serde(default)]
    pub voided: bool,

    #[serde(default)]
    pub void_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestEncounter {
    pub uuid: String,

    #[serde(default)]
    pub encounter_type: Option<RestRef>,

    #[serde(default)]
    pub patient: Option<RestRef>,

    #[serde(default)]
    pub encounter_datetime: Option<String>,

    #[serde(default)]
    pub encounter_providers: Vec<RestEncounterProvider>,

    #[serde(default)]
    pub orders: Vec<RestOrder>,

    #[serde(default)]
    pub obs: Vec<RestObs>,

    #[serde(default)]
    pub voided: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestConceptName {
    #[serde(default)]
    pub display: Option<String>,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub concept_name_type: Option<String>,
}

impl RestConceptName {
    fn text(&self) -> Option<&str> {
        self.name.as_deref().or(self.display.as_deref())
    }
}

#[derive(Debug, Deserialize)]
pub struct RestDescription {
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestConcept {
    pub uuid: String,

    #[serde(default)]
    pub display: Option<String>,

    #[serde(default)]
    pub name: Option<RestConceptName>,

    #[serde(default)]
    pub names: Vec<RestConceptName>,

    #[serde(default)]
    pub datatype: Option<RestRef>,

    #[serde(default)]
    pub concept_class: Option<RestRef>,

    #[serde(default)]
    pub descriptions: Vec<RestDescription>,

    #[serde(default)]
    pub hi_absolute: Option<f64>,

    #[serde(default)]
    pub low_absolute: Option<f64>,

    #[serde(default)]
    pub retired: bool,
}

/// Response of the encounter transaction endpoint
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionResponse {
    pub encounter_uuid: String,
}

fn concept_ref(reference: RestRef) -> ConceptRef {
    ConceptRef {
        uuid: reference.uuid,
        name: reference.display,
    }
}

fn value_text(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) => Some(text),
        Value::Object(map) => map
            .get("display")
            .or_else(|| map.get("uuid"))
            .and_then(Value::as_str)
            .map(str::to_string),
        other => Some(other.to_string()),
    }
}

impl From<RestOrder> for TestOrder {
    fn from(order: RestOrder) -> Self {
        TestOrder {
            uuid: order.uuid,
            concept: concept_ref(order.concept),
            order_type: order.order_type.and_then(|kind| kind.display),
            accession_number: order.accession_number,
            date_activated: order.date_activated.as_deref().and_then(parse_elis_date_time),
            voided: order.voided,
            void_reason: order.void_reason,
        }
    }
}

impl From<RestObs> for Obs {
    fn from(obs: RestObs) -> Self {
        Obs {
            uuid: obs.uuid,
            concept: concept_ref(obs.concept),
            value_text: obs.value.and_then(value_text),
            obs_datetime: obs.obs_datetime.as_deref().and_then(parse_elis_date_time),
            comment: obs.comment,
            order_uuid: obs.order.map(|order| order.uuid),
            group_members: obs
                .group_members
                .unwrap_or_default()
                .into_iter()
                .map(Obs::from)
                .collect(),
            voided: obs.voided,
            void_reason: obs.void_reason,
        }
    }
}

impl From<RestEncounter> for Encounter {
    fn from(encounter: RestEncounter) -> Self {
        let encounter_type = encounter
            .encounter_type
            .map(|kind| EncounterType {
                name: kind.display.clone().unwrap_or_default(),
                uuid: Some(kind.uuid),
            })
            .unwrap_or_default();

        Encounter {
            uuid: encounter.uuid,
            encounter_type,
            patient_uuid: encounter.patient.map(|patient| patient.uuid),
            encounter_datetime: encounter
                .encounter_datetime
                .as_deref()
                .and_then(parse_elis_date_time),
            provider_uuid: encounter
                .encounter_providers
                .into_iter()
                .find_map(|link| link.provider.map(|provider| provider.uuid)),
            orders: encounter.orders.into_iter().map(TestOrder::from).collect(),
            obs: encounter.obs.into_iter().map(Obs::from).collect(),
            voided: encounter.voided,
        }
    }
}

impl From<RestConcept> for Concept {
    fn from(concept: RestConcept) -> Self {
        let name = concept
            .name
            .as_ref()
            .and_then(RestConceptName::text)
            .or(concept.display.as_deref())
            .unwrap_or_default()
            .to_string();
        let short_name = concept
            .names
            .iter()
            .find(|name| name.concept_name_type.as_deref() == Some("SHORT"))
            .and_then(RestConceptName::text)
            .map(str::to_string);

        Concept {
            uuid: concept.uuid,
            name,
            short_name,
            description: concept
                .descriptions
                .into_iter()
                .find_map(|description| description.description),
            datatype: concept
                .datatype
                .and_then(|datatype| datatype.display)
                .map(|display| ConceptDatatype::from_display(&display))
                .unwrap_or_default(),
            concept_class: concept.concept_class.and_then(|class| class.display),
            hi_absolute: concept.hi_absolute,
            low_absolute: concept.low_absolute,
            retired: concept.retired,
        }
    }
}

fn obs_payload(obs: &Obs) -> Value {
    json!({
        "uuid": obs.uuid,
        "concept": obs.concept.uuid,
        "value": obs.value_text,
        "obsDatetime": obs.obs_datetime.map(|date| date.to_rfc3339()),
        "comment": obs.comment,
        "order": obs.order_uuid,
        "voided": obs.voided,
        "voidReason": obs.void_reason,
        "groupMembers": obs.group_members.iter().map(obs_payload).collect::<Vec<_>>(),
    })
}

/// Request body for creating or updating an encounter
pub fn encounter_payload(encounter: &Encounter) -> Value {
    let orders: Vec<Value> = encounter
        .orders
        .iter()
        .map(|order| {
            json!({
                "uuid": order.uuid,
                "type": "testorder",
                "concept": order.concept.uuid,
                "orderType": order.order_type,
                "accessionNumber": order.accession_number,
                "voided": order.voided,
                "voidReason": order.void_reason,
            })
        })
        .collect();

    let providers: Vec<Value> = encounter
        .provider_uuid
        .iter()
        .map(|provider| json!({ "provider": provider }))
        .collect();

    let encounter_type = encounter
        .encounter_type
        .uuid
        .as_deref()
        .unwrap_or(&encounter.encounter_type.name);

    json!({
        "uuid": encounter.uuid,
        "encounterType": encounter_type,
        "patient": encounter.patient_uuid,
        "encounterDatetime": encounter.encounter_datetime.map(|date| date.to_rfc3339()),
        "encounterProviders": providers,
        "orders": orders,
        "obs": encounter.obs.iter().map(obs_payload).collect::<Vec<_>>(),
    })
}

/// Request body for creating or updating a concept
pub fn concept_payload(concept: &Concept) -> Value {
    let mut names = vec![json!({
        "name": concept.name,
        "locale": "en",
        "conceptNameType": "FULLY_SPECIFIED",
    })];
    if let Some(ref short_name) = concept.short_name {
        names.push(json!({
            "name": short_name,
            "locale": "en",
            "conceptNameType": "SHORT",
        }));
    }

    let descriptions: Vec<Value> = concept
        .description
        .iter()
        .map(|description| json!({ "description": description, "locale": "en" }))
        .collect();

    json!({
        "uuid": concept.uuid,
        "names": names,
        "descriptions": descriptions,
        "datatype": concept.datatype.display(),
        "conceptClass": concept.concept_class,
        "hiAbsolute": concept.hi_absolute,
        "lowAbsolute": concept.low_absolute,
    })
}
