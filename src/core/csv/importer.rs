//! Encounter CSV importer
//!
//! One row is one encounter. The fixed columns identify the patient and the
//! encounter, every column prefixed with the observation prefix (`Obs.` by
//! default) is an observation header:
//!
//! ```text
//! Registration Number,Encounter Type,Visit Type,Encounter Date,Obs.Vitals.Height
//! GAN200001,Consultation,OPD,2019-11-11,170
//! ```

use super::handler::CsvObsHandler;
use super::row::{EncounterRow, KeyValue};
use super::summary::ImportSummary;
use crate::adapters::openmrs::EncounterTransactionService;
use crate::config::CsvConfig;
use crate::core::transaction::EncounterTransaction;
use crate::domain::{CsvImportError, Result, RowErrorDetail};
use csv::ReaderBuilder;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

pub const PATIENT_IDENTIFIER_COLUMN: &str = "Registration Number";
pub const ENCOUNTER_TYPE_COLUMN: &str = "Encounter Type";
pub const VISIT_TYPE_COLUMN: &str = "Visit Type";
pub const ENCOUNTER_DATE_COLUMN: &str = "Encounter Date";

/// Reads encounter rows from CSV data
///
/// # Errors
///
/// [`CsvImportError::MissingColumn`] when a required column is absent, or a
/// CSV error when the data is not valid CSV.
pub fn read_rows<R: Read>(reader: R, obs_prefix: &str) -> Result<Vec<EncounterRow>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|header| header.trim_matches('\u{feff}').trim().to_string())
        .collect();

    let column = |name: &str| headers.iter().position(|header| header == name);
    let patient_column = column(PATIENT_IDENTIFIER_COLUMN)
        .ok_or_else(|| CsvImportError::MissingColumn(PATIENT_IDENTIFIER_COLUMN.to_string()))?;
    let encounter_type_column = column(ENCOUNTER_TYPE_COLUMN)
        .ok_or_else(|| CsvImportError::MissingColumn(ENCOUNTER_TYPE_COLUMN.to_string()))?;
    let visit_type_column = column(VISIT_TYPE_COLUMN);
    let date_column = column(ENCOUNTER_DATE_COLUMN);

    let obs_columns: Vec<(usize, String)> = headers
        .iter()
        .enumerate()
        .filter_map(|(index, header)| {
            header
                .strip_prefix(obs_prefix)
                .filter(|key| !key.is_empty())
                .map(|key| (index, key.to_string()))
        })
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let field = |index: Option<usize>| {
            index
                .and_then(|index| record.get(index))
                .map(|value| value.trim().to_string())
                .unwrap_or_default()
        };

        rows.push(EncounterRow {
            patient_identifier: field(Some(patient_column)),
            encounter_type: field(Some(encounter_type_column)),
            visit_type: field(visit_type_column),
            encounter_date_time: field(date_column),
            obs_rows: obs_columns
                .iter()
                .map(|(index, key)| KeyValue::new(key.as_str(), field(Some(*index))))
                .collect(),
        });
    }
    Ok(rows)
}

/// Imports encounter rows as Bahmni encounter transactions
pub struct EncounterCsvImporter {
    handler: Arc<dyn CsvObsHandler>,
    transactions: Arc<dyn EncounterTransactionService>,
    config: CsvConfig,
    dry_run: bool,
}

impl EncounterCsvImporter {
    pub fn new(
        handler: Arc<dyn CsvObsHandler>,
        transactions: Arc<dyn EncounterTransactionService>,
        config: CsvConfig,
    ) -> Self {
        Self {
            handler,
            transactions,
            config,
            dry_run: false,
        }
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Reads and imports a CSV file
    ///
    /// # Errors
    ///
    /// Only file level problems fail the import. Row level problems are
    /// collected in the summary.
    pub async fn import_file(&self, path: &Path) -> Result<ImportSummary> {
        tracing::info!(path = %path.display(), dry_run = self.dry_run, "Starting CSV import");
        let file = std::fs::File::open(path)?;
        let rows = read_rows(file, &self.config.obs_column_prefix)?;
        Ok(self.import_rows(&rows).await)
    }

    pub async fn import_rows(&self, rows: &[EncounterRow]) -> ImportSummary {
        let started = Instant::now();
        let mut summary = ImportSummary::new(self.dry_run);
        summary.rows_total = rows.len();

        for (index, row) in rows.iter().enumerate() {
            let row_number = index + 1;
            match self.import_row(row).await {
                Ok(None) => {
                    tracing::debug!(row = row_number, "Row has no observations, skipping");
                    summary.rows_skipped += 1;
                }
                Ok(Some((observations, encounter_uuid))) => {
                    summary.rows_imported += 1;
                    summary.observations_created += observations;
                    summary.encounter_uuids.extend(encounter_uuid);
                }
                Err(e) => {
                    let mut detail = RowErrorDetail::new(row_number, e.to_string());
                    if !row.patient_identifier.is_empty() {
                        detail = detail.with_patient_identifier(row.patient_identifier.as_str());
                    }
                    summary.add_error(detail);
                }
            }
        }

        let summary = summary.with_duration(started.elapsed());
        summary.log_summary();
        summary
    }

    /// Returns the number of observations and the saved encounter uuid, or
    /// `None` when the row has nothing to import
    async fn import_row(&self, row: &EncounterRow) -> Result<Option<(usize, Option<String>)>> {
        if row.patient_identifier.is_empty() {
            return Err(CsvImportError::Malformed(format!(
                "'{PATIENT_IDENTIFIER_COLUMN}' is blank"
            ))
            .into());
        }
        if row.encounter_type.is_empty() {
            return Err(
                CsvImportError::Malformed(format!("'{ENCOUNTER_TYPE_COLUMN}' is blank")).into(),
            );
        }

        if !row.has_observations() {
            return Ok(None);
        }

        let observations = self.handler.handle(row).await?;
        if observations.is_empty() {
            return Ok(None);
        }

        let transaction = EncounterTransaction {
            patient_identifier: Some(row.patient_identifier.clone()),
            encounter_type: Some(row.encounter_type.clone()),
            visit_type: Some(row.visit_type.clone()).filter(|visit| !visit.is_empty()),
            encounter_date_time: row.encounter_date(&self.config.date_formats)?,
            observations,
            ..Default::default()
        };
        let count = transaction.observations.len();

        if self.dry_run {
            tracing::info!(
                patient_identifier = %row.patient_identifier,
                observations = count,
                "Dry run: skipping encounter transaction save"
            );
            return Ok(Some((count, None)));
        }

        let encounter_uuid = self.transactions.save_transaction(&transaction).await?;
        tracing::info!(
            patient_identifier = %row.patient_identifier,
            encounter_uuid = %encounter_uuid,
            observations = count,
            "Encounter transaction saved"
        );
        Ok(Some((count, Some(encounter_uuid))))
    }
}
