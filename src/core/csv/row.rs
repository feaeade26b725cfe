//! Parsed CSV rows

use crate::domain::CsvImportError;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// A `header -> value` pair from an observation column
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyValue {
    pub key: String,
    pub value: String,
}

impl KeyValue {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn has_value(&self) -> bool {
        !self.value.trim().is_empty()
    }
}

/// One encounter worth of observations for a patient
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EncounterRow {
    pub patient_identifier: String,
    pub encounter_type: String,
    pub visit_type: String,

    /// Raw encounter date as written in the file
    pub encounter_date_time: String,

    pub obs_rows: Vec<KeyValue>,
}

impl EncounterRow {
    /// Parses the encounter date with the first matching format
    ///
    /// Date-only formats resolve to midnight UTC. A blank date yields `None`.
    ///
    /// # Errors
    ///
    /// [`CsvImportError::InvalidDate`] when no format matches.
    pub fn encounter_date(
        &self,
        formats: &[String],
    ) -> Result<Option<DateTime<Utc>>, CsvImportError> {
        let raw = self.encounter_date_time.trim();
        if raw.is_empty() {
            return Ok(None);
        }

        for format in formats {
            if let Ok(date_time) = NaiveDateTime::parse_from_str(raw, format) {
                return Ok(Some(date_time.and_utc()));
            }
            if let Ok(date) = NaiveDate::parse_from_str(raw, format) {
                if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
                    return Ok(Some(midnight.and_utc()));
                }
            }
        }

        Err(CsvImportError::InvalidDate {
            value: raw.to_string(),
        })
    }

    pub fn has_observations(&self) -> bool {
        self.obs_rows.iter().any(KeyValue::has_value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    fn formats() -> Vec<String> {
        vec!["%Y-%m-%d".to_string(), "%d/%m/%Y %H:%M".to_string()]
    }

    fn row_dated(date: &str) -> EncounterRow {
        EncounterRow {
            encounter_date_time: date.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_encounter_date_formats() {
        let date = row_dated("2019-11-11").encounter_date(&formats()).unwrap().unwrap();
        assert_eq!((date.year(), date.month(), date.day()), (2019, 11, 11));
        assert_eq!(date.hour(), 0);

        let date = row_dated("2019-1-5").encounter_date(&formats()).unwrap().unwrap();
        assert_eq!((date.month(), date.day()), (1, 5));

        let date = row_dated("11/11/2019 14:30").encounter_date(&formats()).unwrap().unwrap();
        assert_eq!(date.hour(), 14);
    }

    #[test]
    fn test_blank_encounter_date() {
        assert_eq!(row_dated("  ").encounter_date(&formats()), Ok(None));
    }

    #[test]
    fn test_invalid_encounter_date() {
        assert_eq!(
            row_dated("11th Nov").encounter_date(&formats()),
            Err(CsvImportError::InvalidDate {
                value: "11th Nov".to_string()
            })
        );
    }

    #[test]
    fn test_has_observations_ignores_blank_values() {
        let mut row = EncounterRow::default();
        row.obs_rows.push(KeyValue::new("Vitals.Height", " "));
        assert!(!row.has_observations());

        row.obs_rows.push(KeyValue::new("Vitals.Weight", "70"));
        assert!(row.has_observations());
    }
}
