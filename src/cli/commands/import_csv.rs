//! Import-csv command implementation

use super::load_valid_config;
use crate::adapters::openmrs::create_openmrs_services;
use crate::cli::{exit_code_for, EXIT_CONFIG, EXIT_CONNECTION, EXIT_PARTIAL, EXIT_SUCCESS};
use crate::core::csv::{CsvObservationHelper, EncounterCsvImporter, Form1CsvObsHandler};
use crate::log_error_with_context;
use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;

/// Arguments for the import-csv command
#[derive(Args, Debug)]
pub struct ImportCsvArgs {
    /// CSV file to import
    #[arg(short, long)]
    pub file: PathBuf,

    /// Validate and map every row without saving
    #[arg(long)]
    pub dry_run: bool,
}

impl ImportCsvArgs {
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let Some(config) = load_valid_config(config_path) else {
            return Ok(EXIT_CONFIG);
        };
        let dry_run = self.dry_run || config.application.dry_run;

        let services = match create_openmrs_services(&config) {
            Ok(services) => services,
            Err(e) => {
                log_error_with_context!(&e, "Failed to create OpenMRS client");
                eprintln!("❌ Failed to initialize OpenMRS client: {e}");
                return Ok(EXIT_CONNECTION);
            }
        };

        let helper = Arc::new(CsvObservationHelper::new(
            services.concepts,
            config.csv.form2_prefix.as_str(),
        ));
        let handler = Arc::new(Form1CsvObsHandler::new(
            helper,
            config.csv.date_formats.clone(),
        ));
        let importer = EncounterCsvImporter::new(handler, services.transactions, config.csv)
            .with_dry_run(dry_run);

        if dry_run {
            println!("🔍 DRY RUN MODE - nothing will be saved to OpenMRS");
        }
        println!("📄 Importing {}", self.file.display());

        let summary = match importer.import_file(&self.file).await {
            Ok(summary) => summary,
            Err(e) => {
                log_error_with_context!(&e, "CSV import failed");
                eprintln!("❌ Import failed: {e}");
                return Ok(exit_code_for(&e));
            }
        };

        println!();
        println!("Import Summary:");
        println!("  Rows: {}", summary.rows_total);
        println!("  Imported: {}", summary.rows_imported);
        println!("  Skipped (no observations): {}", summary.rows_skipped);
        println!("  Failed: {}", summary.rows_failed);
        println!("  Observations: {}", summary.observations_created);
        println!("  Duration: {:.2}s", summary.duration.as_secs_f64());
        for error in &summary.errors {
            println!(
                "  ⚠️  Row {} ({}): {}",
                error.row_number,
                error.patient_identifier.as_deref().unwrap_or("-"),
                error.message
            );
        }
        println!();

        if summary.is_successful() {
            println!("✅ Import completed");
            Ok(EXIT_SUCCESS)
        } else {
            println!("⚠️  Import completed with errors");
            Ok(EXIT_PARTIAL)
        }
    }
}
