//! CSV observation handlers

use super::helper::ObservationHelper;
use super::row::{EncounterRow, KeyValue};
use crate::core::transaction::EtObservation;
use crate::domain::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Turns the observation columns of a row into observations for one form
/// version
#[async_trait]
pub trait CsvObsHandler: Send + Sync {
    /// The pairs of the row this handler is responsible for
    fn get_related_csv_obs(&self, row: &EncounterRow) -> Vec<KeyValue>;

    /// Builds the observations for the related, non-blank pairs of the row
    async fn handle(&self, row: &EncounterRow) -> Result<Vec<EtObservation>>;
}

/// Handler for form-version 1 columns
pub struct Form1CsvObsHandler {
    helper: Arc<dyn ObservationHelper>,
    date_formats: Vec<String>,
}

impl Form1CsvObsHandler {
    pub fn new(helper: Arc<dyn ObservationHelper>, date_formats: Vec<String>) -> Self {
        Self {
            helper,
            date_formats,
        }
    }
}

#[async_trait]
impl CsvObsHandler for Form1CsvObsHandler {
    fn get_related_csv_obs(&self, row: &EncounterRow) -> Vec<KeyValue> {
        row.obs_rows
            .iter()
            .filter(|obs| self.helper.is_form1_type(obs))
            .cloned()
            .collect()
    }

    /// # Errors
    ///
    /// An unparseable encounter date fails the whole row, as does any helper
    /// error. The date is only parsed when the row has something to import.
    async fn handle(&self, row: &EncounterRow) -> Result<Vec<EtObservation>> {
        let related: Vec<KeyValue> = self
            .get_related_csv_obs(row)
            .into_iter()
            .filter(KeyValue::has_value)
            .collect();

        let mut observations = Vec::new();
        if related.is_empty() {
            return Ok(observations);
        }

        let encounter_date = row.encounter_date(&self.date_formats)?;
        for obs in &related {
            let concept_names = self.helper.get_csv_header_parts(obs);
            self.helper
                .verify_numeric_concept_value(obs, &concept_names)
                .await?;
            self.helper
                .create_observations(&mut observations, encounter_date, obs, &concept_names)
                .await?;
        }

        tracing::debug!(
            patient_identifier = %row.patient_identifier,
            observations = observations.len(),
            "Handled form1 observations"
        );
        Ok(observations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::transaction::EtConcept;
    use crate::domain::{BridgeError, CsvImportError};
    use chrono::{DateTime, Utc};
    use std::sync::Mutex;

    /// Records every helper call
    #[derive(Default)]
    struct RecordingHelper {
        calls: Mutex<Vec<String>>,
    }

    impl RecordingHelper {
        fn record(&self, call: String) {
            self.calls.lock().unwrap().push(call);
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ObservationHelper for RecordingHelper {
        fn is_form1_type(&self, obs: &KeyValue) -> bool {
            self.record(format!("is_form1_type {}", obs.key));
            !obs.key.starts_with("form2.")
        }

        fn is_form2_type(&self, obs: &KeyValue) -> bool {
            obs.key.starts_with("form2.")
        }

        fn get_csv_header_parts(&self, obs: &KeyValue) -> Vec<String> {
            self.record(format!("get_csv_header_parts {}", obs.key));
            obs.key.split('.').map(str::to_string).collect()
        }

        async fn verify_numeric_concept_value(
            &self,
            obs: &KeyValue,
            concept_names: &[String],
        ) -> Result<()> {
            self.record(format!(
                "verify_numeric_concept_value {} {}",
                obs.key,
                concept_names.join("/")
            ));
            Ok(())
        }

        async fn create_observations(
            &self,
            observations: &mut Vec<EtObservation>,
            encounter_date: Option<DateTime<Utc>>,
            obs: &KeyValue,
            concept_names: &[String],
        ) -> Result<()> {
            self.record(format!("create_observations {}", obs.key));
            let leaf = concept_names.last().cloned().unwrap_or_default();
            observations.push(
                EtObservation::new(EtConcept::new(None, leaf))
                    .with_value(obs.value.as_str())
                    .with_observation_date_time(encounter_date),
            );
            Ok(())
        }
    }

    fn row() -> EncounterRow {
        EncounterRow {
            patient_identifier: "GAN200001".to_string(),
            encounter_date_time: "2019-11-11".to_string(),
            obs_rows: vec![
                KeyValue::new("Vitals.Height", "100"),
                KeyValue::new("form2.Vitals.Height", "100"),
            ],
            ..Default::default()
        }
    }

    fn handler(helper: Arc<RecordingHelper>) -> Form1CsvObsHandler {
        Form1CsvObsHandler::new(helper, vec!["%Y-%m-%d".to_string()])
    }

    #[test]
    fn test_filters_form1_obs() {
        let helper = Arc::new(RecordingHelper::default());
        let related = handler(helper.clone()).get_related_csv_obs(&row());

        assert_eq!(related, vec![KeyValue::new("Vitals.Height", "100")]);
        assert_eq!(
            helper.calls(),
            vec![
                "is_form1_type Vitals.Height".to_string(),
                "is_form1_type form2.Vitals.Height".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_handle_runs_helper_pipeline_for_form1_obs() {
        let helper = Arc::new(RecordingHelper::default());
        let observations = handler(helper.clone()).handle(&row()).await.unwrap();

        assert_eq!(
            helper.calls(),
            vec![
                "is_form1_type Vitals.Height".to_string(),
                "is_form1_type form2.Vitals.Height".to_string(),
                "get_csv_header_parts Vitals.Height".to_string(),
                "verify_numeric_concept_value Vitals.Height Vitals/Height".to_string(),
                "create_observations Vitals.Height".to_string(),
            ]
        );
        assert_eq!(observations.len(), 1);
        assert!(observations[0].observation_date_time.is_some());
    }

    #[tokio::test]
    async fn test_invalid_date_aborts_row() {
        let helper = Arc::new(RecordingHelper::default());
        let mut row = row();
        row.encounter_date_time = "11-2019-11".to_string();

        let err = handler(helper.clone()).handle(&row).await.unwrap_err();
        assert!(matches!(
            err,
            BridgeError::CsvImport(CsvImportError::InvalidDate { .. })
        ));
        assert!(!helper
            .calls()
            .iter()
            .any(|call| call.starts_with("create_observations")));
    }

    #[tokio::test]
    async fn test_blank_values_are_skipped() {
        let helper = Arc::new(RecordingHelper::default());
        let mut row = row();
        row.obs_rows = vec![KeyValue::new("Vitals.Height", "  ")];
        row.encounter_date_time = "not a date".to_string();

        let observations = handler(helper).handle(&row).await.unwrap();
        assert!(observations.is_empty());
    }
}
