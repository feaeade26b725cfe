//! OpenELIS accession model
//!
//! Deserialized straight from the JSON OpenELIS serves for
//! `/openelis/accession/{uuid}`. Unknown fields are ignored.

use super::ids::AccessionUuid;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// Status OpenELIS reports for a test that was withdrawn from the accession
pub const CANCELED_STATUS: &str = "Canceled";

/// A lab accession snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenElisAccession {
    /// Accession uuid, reused as the local encounter uuid
    pub accession_uuid: AccessionUuid,

    /// OpenMRS patient uuid
    pub patient_uuid: String,

    #[serde(default)]
    pub patient_identifier: Option<String>,

    #[serde(default)]
    pub patient_first_name: Option<String>,

    #[serde(default)]
    pub patient_last_name: Option<String>,

    /// When the accession was collected
    #[serde(default)]
    pub date_time: Option<String>,

    /// Tests requested under this accession
    #[serde(default)]
    pub test_details: Vec<OpenElisTestDetail>,
}

impl OpenElisAccession {
    /// Creates an accession with no test details
    pub fn new(accession_uuid: AccessionUuid, patient_uuid: impl Into<String>) -> Self {
        Self {
            accession_uuid,
            patient_uuid: patient_uuid.into(),
            patient_identifier: None,
            patient_first_name: None,
            patient_last_name: None,
            date_time: None,
            test_details: Vec::new(),
        }
    }

    /// Replaces the test details
    pub fn with_test_details(mut self, test_details: Vec<OpenElisTestDetail>) -> Self {
        self.test_details = test_details;
        self
    }

    /// Sets the collection date-time
    pub fn with_date_time(mut self, date_time: impl Into<String>) -> Self {
        self.date_time = Some(date_time.into());
        self
    }

    /// Test details that have not been canceled
    pub fn active_test_details(&self) -> impl Iterator<Item = &OpenElisTestDetail> {
        self.test_details.iter().filter(|detail| !detail.is_canceled())
    }
}

/// One test line of an accession
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenElisTestDetail {
    #[serde(default)]
    pub test_name: Option<String>,

    /// Concept uuid of the test
    pub test_uuid: String,

    /// Concept uuid of the panel this test was ordered through, if any
    #[serde(default)]
    pub panel_uuid: Option<String>,

    #[serde(default)]
    pub test_unit_of_measurement: Option<String>,

    #[serde(default)]
    pub min_normal: Option<f64>,

    #[serde(default)]
    pub max_normal: Option<f64>,

    #[serde(default)]
    pub result: Option<String>,

    #[serde(default)]
    pub notes: Option<String>,

    #[serde(default)]
    pub result_type: Option<String>,

    #[serde(default)]
    pub provider_uuid: Option<String>,

    #[serde(default)]
    pub date_time: Option<String>,

    #[serde(default)]
    pub status: Option<String>,

    #[serde(default)]
    pub abnormal: Option<bool>,
}

impl OpenElisTestDetail {
    /// Creates a test detail for the given test concept
    pub fn new(test_uuid: impl Into<String>) -> Self {
        Self {
            test_uuid: test_uuid.into(),
            ..Default::default()
        }
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    pub fn with_panel_uuid(mut self, panel_uuid: impl Into<String>) -> Self {
        self.panel_uuid = Some(panel_uuid.into());
        self
    }

    pub fn with_result(mut self, result: impl Into<String>, date_time: impl Into<String>) -> Self {
        self.result = Some(result.into());
        self.date_time = Some(date_time.into());
        self
    }

    /// True when OpenELIS withdrew the test
    pub fn is_canceled(&self) -> bool {
        self.status.as_deref() == Some(CANCELED_STATUS)
    }

    /// Panel uuid if the test belongs to a non-blank panel
    pub fn panel(&self) -> Option<&str> {
        self.panel_uuid
            .as_deref()
            .map(str::trim)
            .filter(|panel| !panel.is_empty())
    }

    /// Concept uuid that is actually ordered: the panel when present, else the test
    pub fn orderable_uuid(&self) -> &str {
        self.panel().unwrap_or(&self.test_uuid)
    }

    /// True when a non-blank result has been reported
    pub fn has_result(&self) -> bool {
        self.result
            .as_deref()
            .map(|result| !result.trim().is_empty())
            .unwrap_or(false)
    }
}

/// Parses the date-time formats OpenELIS emits
///
/// Accepts RFC 3339 as well as offsets without a colon (`+0530`), and falls back
/// to a naive timestamp interpreted as UTC.
pub fn parse_elis_date_time(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&Utc));
    }
    if let Ok(parsed) = DateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f%z") {
        return Some(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_deserialize_accession() {
        let json = r#"{
            "accessionUuid": "12-34-56-78",
            "patientUuid": "patient-1",
            "patientIdentifier": "GAN200001",
            "dateTime": "2014-01-30T11:50:18+0530",
            "unknownField": 42,
            "testDetails": [
                {"testUuid": "test1", "status": "Not started"},
                {"testUuid": "test2", "panelUuid": "panel1", "status": "Canceled"}
            ]
        }"#;

        let accession: OpenElisAccession = serde_json::from_str(json).unwrap();
        assert_eq!(accession.accession_uuid.as_str(), "12-34-56-78");
        assert_eq!(accession.test_details.len(), 2);
        assert!(!accession.test_details[0].is_canceled());
        assert!(accession.test_details[1].is_canceled());
        assert_eq!(accession.active_test_details().count(), 1);
    }

    #[test]
    fn test_orderable_uuid_prefers_panel() {
        let detail = OpenElisTestDetail::new("test1").with_panel_uuid("panel1");
        assert_eq!(detail.orderable_uuid(), "panel1");

        let blank_panel = OpenElisTestDetail::new("test1").with_panel_uuid("  ");
        assert_eq!(blank_panel.orderable_uuid(), "test1");
        assert!(blank_panel.panel().is_none());
    }

    #[test]
    fn test_has_result() {
        assert!(!OpenElisTestDetail::new("t").has_result());
        assert!(!OpenElisTestDetail::new("t")
            .with_result(" ", "2014-01-30T11:50:18+0530")
            .has_result());
        assert!(OpenElisTestDetail::new("t")
            .with_result("12.5", "2014-01-30T11:50:18+0530")
            .has_result());
    }

    #[test]
    fn test_parse_elis_date_time_formats() {
        let compact = parse_elis_date_time("2014-01-30T11:50:18+0530").unwrap();
        assert_eq!(compact.hour(), 6);
        assert_eq!(compact.minute(), 20);

        let rfc = parse_elis_date_time("2014-01-30T11:50:18Z").unwrap();
        assert_eq!(rfc.day(), 30);

        let naive = parse_elis_date_time("2014-01-30T11:50:18.000").unwrap();
        assert_eq!(naive.hour(), 11);

        assert!(parse_elis_date_time("30/01/2014").is_none());
    }
}
