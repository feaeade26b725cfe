//! Integration tests for the encounter CSV import

use bahmni_bridge::adapters::openmrs::InMemoryOpenMrs;
use bahmni_bridge::config::CsvConfig;
use bahmni_bridge::core::csv::{CsvObservationHelper, EncounterCsvImporter, Form1CsvObsHandler};
use bahmni_bridge::domain::{Concept, ConceptDatatype};
use chrono::{TimeZone, Utc};
use std::io::Write;
use std::sync::Arc;
use tempfile::NamedTempFile;

async fn store() -> Arc<InMemoryOpenMrs> {
    let store = Arc::new(InMemoryOpenMrs::new());
    store
        .insert_concept(Concept::new("vitals-uuid", "Vitals", ConceptDatatype::NotApplicable))
        .await;
    let mut height = Concept::new("height-uuid", "Height", ConceptDatatype::Numeric);
    height.low_absolute = Some(0.0);
    height.hi_absolute = Some(272.0);
    store.insert_concept(height).await;
    store
        .insert_concept(Concept::new("weight-uuid", "Weight", ConceptDatatype::Numeric))
        .await;
    store
        .insert_concept(Concept::new("notes-uuid", "Notes", ConceptDatatype::Text))
        .await;
    store
}

fn importer(store: Arc<InMemoryOpenMrs>, dry_run: bool) -> EncounterCsvImporter {
    let config = CsvConfig::default();
    let helper = Arc::new(CsvObservationHelper::new(
        store.clone(),
        config.form2_prefix.as_str(),
    ));
    let handler = Arc::new(Form1CsvObsHandler::new(helper, config.date_formats.clone()));
    EncounterCsvImporter::new(handler, store, config).with_dry_run(dry_run)
}

fn csv_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

const ENCOUNTERS: &str = "\
Registration Number,Encounter Type,Visit Type,Encounter Date,Obs.Vitals.Height,Obs.Vitals.Weight,Obs.Notes,Obs.form2.Vitals.Height
GAN200001,Consultation,OPD,2019-11-11,170,70,Doing well,171
GAN200002,Consultation,OPD,2019-11-12,,,,
";

#[tokio::test]
async fn test_imports_form1_observations() {
    let store = store().await;
    let file = csv_file(ENCOUNTERS);

    let summary = importer(store.clone(), false)
        .import_file(file.path())
        .await
        .unwrap();

    assert_eq!(summary.rows_total, 2);
    assert_eq!(summary.rows_imported, 1);
    assert_eq!(summary.rows_skipped, 1);
    assert_eq!(summary.rows_failed, 0);
    assert_eq!(summary.observations_created, 2);
    assert_eq!(summary.encounter_uuids.len(), 1);

    let transactions = store.saved_transactions().await;
    assert_eq!(transactions.len(), 1);
    let transaction = &transactions[0];
    assert_eq!(transaction.patient_identifier.as_deref(), Some("GAN200001"));
    assert_eq!(transaction.encounter_type.as_deref(), Some("Consultation"));
    assert_eq!(transaction.visit_type.as_deref(), Some("OPD"));
    assert_eq!(
        transaction.encounter_date_time,
        Some(Utc.with_ymd_and_hms(2019, 11, 11, 0, 0, 0).unwrap())
    );

    // Vitals group with two members, plus Notes; the form2 column is ignored
    let vitals = &transaction.observations[0];
    assert_eq!(vitals.concept.uuid.as_deref(), Some("vitals-uuid"));
    assert_eq!(vitals.group_members.len(), 2);
    assert_eq!(vitals.group_members[0].value.as_deref(), Some("170"));
    assert_eq!(vitals.group_members[1].value.as_deref(), Some("70"));
    assert_eq!(transaction.observations[1].value.as_deref(), Some("Doing well"));
}

#[tokio::test]
async fn test_dry_run_saves_nothing() {
    let store = store().await;
    let file = csv_file(ENCOUNTERS);

    let summary = importer(store.clone(), true)
        .import_file(file.path())
        .await
        .unwrap();

    assert!(summary.dry_run);
    assert_eq!(summary.rows_imported, 1);
    assert!(summary.encounter_uuids.is_empty());
    assert!(store.saved_transactions().await.is_empty());
}

#[tokio::test]
async fn test_row_errors_are_collected() {
    let store = store().await;
    let file = csv_file(
        "\
Registration Number,Encounter Type,Encounter Date,Obs.Vitals.Height,Obs.BMI
GAN200001,Consultation,2019-11-11,170,
GAN200002,Consultation,2019-11-11,tall,
GAN200003,Consultation,2019-11-11,300,
GAN200004,Consultation,11th Nov,170,
GAN200005,Consultation,2019-11-11,,22
,Consultation,2019-11-11,170,
",
    );

    let summary = importer(store.clone(), false)
        .import_file(file.path())
        .await
        .unwrap();

    assert_eq!(summary.rows_total, 6);
    assert_eq!(summary.rows_imported, 1);
    assert_eq!(summary.rows_failed, 5);
    assert!(summary.is_partial());

    let rows: Vec<usize> = summary.errors.iter().map(|e| e.row_number).collect();
    assert_eq!(rows, vec![2, 3, 4, 5, 6]);
    assert_eq!(summary.errors[0].patient_identifier.as_deref(), Some("GAN200002"));
    assert!(summary.errors[0].message.contains("tall"));
    assert!(summary.errors[2].message.contains("11th Nov"));
    assert!(summary.errors[3].message.contains("BMI"));
    assert!(summary.errors[4].patient_identifier.is_none());

    assert_eq!(store.saved_transactions().await.len(), 1);
}

#[tokio::test]
async fn test_missing_required_column_fails_import() {
    let store = store().await;
    let file = csv_file("Registration Number,Obs.Vitals.Height\nGAN200001,170\n");

    let result = importer(store.clone(), false).import_file(file.path()).await;

    assert!(result.is_err());
    assert!(store.saved_transactions().await.is_empty());
}
