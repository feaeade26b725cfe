//! Accession to encounter mapping
//!
//! All functions here are pure: they take snapshots and return the encounter
//! that should be persisted. Persistence is the worker's job.

use super::diff::AccessionDiff;
use crate::config::LabConfig;
use crate::domain::{
    parse_elis_date_time, BridgeError, ConceptRef, Encounter, EncounterType, Obs,
    OpenElisAccession, OpenElisTestDetail, Result, TestOrder,
};

/// Void reason for a result replaced by a newer value
const RESULT_SUPERSEDED_REASON: &str = "Result updated in OpenELIS";

/// Builds and updates lab encounters from OpenELIS accessions
#[derive(Debug, Clone)]
pub struct AccessionMapper {
    lab: LabConfig,
}

impl AccessionMapper {
    pub fn new(lab: LabConfig) -> Self {
        Self { lab }
    }

    /// Builds a fresh encounter for an accession never seen before
    ///
    /// The encounter uuid is the accession uuid. One order is created per
    /// distinct orderable of the live test details, and results already
    /// reported are recorded against those orders.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Mapping`] if the accession has no patient.
    pub fn map_to_new_encounter(&self, accession: &OpenElisAccession) -> Result<Encounter> {
        if accession.patient_uuid.trim().is_empty() {
            return Err(BridgeError::Mapping(format!(
                "Accession {} has no patient uuid",
                accession.accession_uuid
            )));
        }

        let mut encounter = Encounter::new(
            accession.accession_uuid.as_str(),
            EncounterType::named(self.lab.encounter_type.as_str()),
        );
        encounter.patient_uuid = Some(accession.patient_uuid.clone());
        encounter.provider_uuid = self.lab.lab_system_provider_uuid.clone();
        encounter.encounter_datetime = accession.date_time.as_deref().and_then(parse_elis_date_time);

        for detail in accession.active_test_details() {
            self.add_order_once(accession, detail, &mut encounter);
        }
        self.record_results(accession, &mut encounter);

        Ok(encounter)
    }

    /// Applies a diff to an existing encounter
    ///
    /// Added details get an order unless their orderable is already actively
    /// ordered. Removed details void the active orders of their orderable,
    /// together with the observations recorded against them.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Mapping`] if the encounter does not belong to
    /// the accession.
    pub fn add_or_void_order_differences(
        &self,
        accession: &OpenElisAccession,
        diff: &AccessionDiff,
        mut encounter: Encounter,
    ) -> Result<Encounter> {
        if encounter.uuid != accession.accession_uuid.as_str() {
            return Err(BridgeError::Mapping(format!(
                "Encounter {} does not belong to accession {}",
                encounter.uuid, accession.accession_uuid
            )));
        }

        for detail in diff.added_test_details() {
            self.add_order_once(accession, detail, &mut encounter);
        }

        for detail in diff.removed_test_details() {
            let voided =
                encounter.void_orders_for(detail.orderable_uuid(), &self.lab.cancellation_reason);
            tracing::debug!(
                accession_uuid = %accession.accession_uuid,
                orderable_uuid = detail.orderable_uuid(),
                voided = voided,
                "Voided canceled test orders"
            );
        }

        Ok(encounter)
    }

    /// Records reported results that the encounter does not hold yet
    ///
    /// A result lands as an observation linked to the active order of its
    /// orderable, grouped under a panel observation for panel tests. A stored
    /// result with a different value is voided and replaced. Returns the
    /// number of observations written.
    pub fn record_results(&self, accession: &OpenElisAccession, encounter: &mut Encounter) -> usize {
        let mut recorded = 0;
        for detail in accession.active_test_details().filter(|d| d.has_result()) {
            let Some(order_uuid) = encounter
                .active_orders()
                .find(|order| order.concept.uuid == detail.orderable_uuid())
                .map(|order| order.uuid.clone())
            else {
                tracing::warn!(
                    accession_uuid = %accession.accession_uuid,
                    test_uuid = %detail.test_uuid,
                    "Result reported for a test without an active order"
                );
                continue;
            };

            let result_obs = result_obs(detail, &order_uuid);
            let slot = match detail.panel() {
                Some(panel_uuid) => &mut panel_group(encounter, panel_uuid).group_members,
                None => &mut encounter.obs,
            };
            if store_result(slot, result_obs) {
                recorded += 1;
            }
        }
        recorded
    }

    fn add_order_once(
        &self,
        accession: &OpenElisAccession,
        detail: &OpenElisTestDetail,
        encounter: &mut Encounter,
    ) {
        let orderable_uuid = detail.orderable_uuid();
        if encounter.has_active_order_for(orderable_uuid) {
            return;
        }

        let concept = match (detail.panel(), detail.test_name.as_deref()) {
            (None, Some(name)) => ConceptRef::named(orderable_uuid, name),
            _ => ConceptRef::new(orderable_uuid),
        };
        let mut order = TestOrder::new(concept);
        order.order_type = Some(self.lab.order_type.clone());
        order.accession_number = Some(accession.accession_uuid.to_string());
        order.date_activated = accession.date_time.as_deref().and_then(parse_elis_date_time);
        encounter.add_order(order);
    }
}

fn result_obs(detail: &OpenElisTestDetail, order_uuid: &str) -> Obs {
    let concept = match detail.test_name.as_deref() {
        Some(name) => ConceptRef::named(detail.test_uuid.as_str(), name),
        None => ConceptRef::new(detail.test_uuid.as_str()),
    };
    let mut obs = Obs::new(concept);
    obs.value_text = detail.result.as_deref().map(|result| result.trim().to_string());
    obs.obs_datetime = detail.date_time.as_deref().and_then(parse_elis_date_time);
    obs.comment = detail.notes.clone().filter(|notes| !notes.trim().is_empty());
    obs.order_uuid = Some(order_uuid.to_string());
    obs
}

/// The live group observation of a panel, created when missing
fn panel_group<'a>(encounter: &'a mut Encounter, panel_uuid: &str) -> &'a mut Obs {
    let existing = encounter
        .obs
        .iter()
        .position(|obs| !obs.voided && obs.concept.uuid == panel_uuid);
    let index = match existing {
        Some(index) => index,
        None => {
            encounter.add_obs(Obs::new(ConceptRef::new(panel_uuid)));
            encounter.obs.len() - 1
        }
    };
    &mut encounter.obs[index]
}

/// Adds the result unless an identical live one is already stored
fn store_result(slot: &mut Vec<Obs>, result: Obs) -> bool {
    let mut unchanged = false;
    for existing in slot
        .iter_mut()
        .filter(|obs| !obs.voided && obs.concept.uuid == result.concept.uuid)
    {
        if existing.value_text == result.value_text {
            unchanged = true;
        } else {
            existing.void(RESULT_SUPERSEDED_REASON);
        }
    }
    if unchanged {
        return false;
    }
    slot.push(result);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::AccessionUuid;

    fn mapper() -> AccessionMapper {
        AccessionMapper::new(LabConfig {
            lab_system_provider_uuid: Some("provider-1".to_string()),
            ..Default::default()
        })
    }

    fn accession(details: Vec<OpenElisTestDetail>) -> OpenElisAccession {
        OpenElisAccession::new(AccessionUuid::new("acc-1").unwrap(), "patient-1")
            .with_date_time("2014-01-30T11:50:18+0530")
            .with_test_details(details)
    }

    #[test]
    fn test_new_encounter_header() {
        let encounter = mapper()
            .map_to_new_encounter(&accession(vec![OpenElisTestDetail::new("test1")]))
            .unwrap();

        assert_eq!(encounter.uuid, "acc-1");
        assert_eq!(encounter.encounter_type.name, "LAB_RESULT");
        assert_eq!(encounter.patient_uuid.as_deref(), Some("patient-1"));
        assert_eq!(encounter.provider_uuid.as_deref(), Some("provider-1"));
        assert!(encounter.encounter_datetime.is_some());
        assert_eq!(encounter.orders.len(), 1);
        assert_eq!(encounter.orders[0].order_type.as_deref(), Some("Lab Order"));
        assert_eq!(encounter.orders[0].accession_number.as_deref(), Some("acc-1"));
    }

    #[test]
    fn test_new_encounter_skips_canceled_and_dedupes_panels() {
        let encounter = mapper()
            .map_to_new_encounter(&accession(vec![
                OpenElisTestDetail::new("test1").with_panel_uuid("panel1"),
                OpenElisTestDetail::new("test2").with_panel_uuid("panel1"),
                OpenElisTestDetail::new("test3").with_status("Canceled"),
                OpenElisTestDetail::new("test4"),
            ]))
            .unwrap();

        let ordered: Vec<&str> = encounter
            .orders
            .iter()
            .map(|order| order.concept.uuid.as_str())
            .collect();
        assert_eq!(ordered, vec!["panel1", "test4"]);
    }

    #[test]
    fn test_new_encounter_requires_patient() {
        let accession = OpenElisAccession::new(AccessionUuid::new("acc-1").unwrap(), " ");
        let err = mapper().map_to_new_encounter(&accession).unwrap_err();
        assert!(matches!(err, BridgeError::Mapping(_)));
    }

    #[test]
    fn test_results_grouped_under_panel() {
        let encounter = mapper()
            .map_to_new_encounter(&accession(vec![
                OpenElisTestDetail::new("test1")
                    .with_panel_uuid("panel1")
                    .with_result("12.5", "2014-01-30T12:00:00+0530"),
                OpenElisTestDetail::new("test2")
                    .with_panel_uuid("panel1")
                    .with_result("4", "2014-01-30T12:00:00+0530"),
                OpenElisTestDetail::new("test3").with_result("Positive", "2014-01-30T12:00:00+0530"),
            ]))
            .unwrap();

        assert_eq!(encounter.obs.len(), 2);
        let panel = &encounter.obs[0];
        assert_eq!(panel.concept.uuid, "panel1");
        assert_eq!(panel.group_members.len(), 2);
        assert_eq!(panel.group_members[0].order_uuid.as_ref(), Some(&encounter.orders[0].uuid));

        let standalone = &encounter.obs[1];
        assert_eq!(standalone.concept.uuid, "test3");
        assert_eq!(standalone.value_text.as_deref(), Some("Positive"));
    }

    #[test]
    fn test_add_order_differences() {
        let mapper = mapper();
        let previous = mapper
            .map_to_new_encounter(&accession(vec![OpenElisTestDetail::new("test1")]))
            .unwrap();
        let current = accession(vec![
            OpenElisTestDetail::new("test1"),
            OpenElisTestDetail::new("test2"),
        ]);

        let diff = AccessionDiff::between(&current, &previous);
        let updated = mapper
            .add_or_void_order_differences(&current, &diff, previous)
            .unwrap();

        assert_eq!(updated.orders.len(), 2);
        assert!(updated.has_active_order_for("test2"));
    }

    #[test]
    fn test_void_order_differences() {
        let mapper = mapper();
        let previous = mapper
            .map_to_new_encounter(&accession(vec![
                OpenElisTestDetail::new("test1"),
                OpenElisTestDetail::new("test3").with_result("7", "2014-01-30T12:00:00+0530"),
            ]))
            .unwrap();
        let current = accession(vec![
            OpenElisTestDetail::new("test1"),
            OpenElisTestDetail::new("test3").with_status("Canceled"),
        ]);

        let diff = AccessionDiff::between(&current, &previous);
        let updated = mapper
            .add_or_void_order_differences(&current, &diff, previous)
            .unwrap();

        let canceled = updated
            .orders
            .iter()
            .find(|order| order.concept.uuid == "test3")
            .unwrap();
        assert!(canceled.voided);
        assert_eq!(canceled.void_reason.as_deref(), Some("Canceled in OpenELIS"));
        assert!(updated.obs[0].voided);
        assert!(updated.has_active_order_for("test1"));
    }

    #[test]
    fn test_differences_rejects_foreign_encounter() {
        let encounter = Encounter::new("other", EncounterType::named("LAB_RESULT"));
        let err = mapper()
            .add_or_void_order_differences(&accession(vec![]), &AccessionDiff::new(), encounter)
            .unwrap_err();
        assert!(matches!(err, BridgeError::Mapping(_)));
    }

    #[test]
    fn test_record_results_is_idempotent_and_replaces_changed_values() {
        let mapper = mapper();
        let first = accession(vec![
            OpenElisTestDetail::new("test1").with_result("10", "2014-01-30T12:00:00+0530")
        ]);
        let mut encounter = mapper.map_to_new_encounter(&first).unwrap();
        assert_eq!(mapper.record_results(&first, &mut encounter), 0);

        let corrected = accession(vec![
            OpenElisTestDetail::new("test1").with_result("11", "2014-01-30T13:00:00+0530")
        ]);
        assert_eq!(mapper.record_results(&corrected, &mut encounter), 1);
        assert_eq!(encounter.obs.len(), 2);
        assert!(encounter.obs[0].voided);
        assert_eq!(encounter.obs[1].value_text.as_deref(), Some("11"));
    }

    #[test]
    fn test_result_without_order_is_skipped() {
        let mapper = mapper();
        let mut encounter = Encounter::new("acc-1", EncounterType::named("LAB_RESULT"));
        let accession = accession(vec![
            OpenElisTestDetail::new("test1").with_result("10", "2014-01-30T12:00:00+0530")
        ]);
        assert_eq!(mapper.record_results(&accession, &mut encounter), 0);
        assert!(encounter.obs.is_empty());
    }
}
