//! CSV import summary and reporting

use crate::domain::RowErrorDetail;
use std::time::Duration;

/// Summary of one CSV import
#[derive(Debug, Clone, Default)]
pub struct ImportSummary {
    /// Data rows read from the file
    pub rows_total: usize,

    /// Rows saved as an encounter transaction (or that would be, in dry run)
    pub rows_imported: usize,

    /// Rows without any non-blank observation
    pub rows_skipped: usize,

    /// Rows rejected by validation or by OpenMRS
    pub rows_failed: usize,

    /// Top-level observations across imported rows
    pub observations_created: usize,

    /// Encounter uuids returned by OpenMRS
    pub encounter_uuids: Vec<String>,

    pub errors: Vec<RowErrorDetail>,

    pub dry_run: bool,

    pub duration: Duration,
}

impl ImportSummary {
    pub fn new(dry_run: bool) -> Self {
        Self {
            dry_run,
            ..Default::default()
        }
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Records a failed row
    pub fn add_error(&mut self, error: RowErrorDetail) {
        self.rows_failed += 1;
        self.errors.push(error);
    }

    /// True when every row was imported or skipped
    pub fn is_successful(&self) -> bool {
        self.rows_failed == 0
    }

    /// True when some rows failed and others made it
    pub fn is_partial(&self) -> bool {
        self.rows_failed > 0 && self.rows_imported > 0
    }

    pub fn log_summary(&self) {
        tracing::info!(
            rows_total = self.rows_total,
            rows_imported = self.rows_imported,
            rows_skipped = self.rows_skipped,
            rows_failed = self.rows_failed,
            observations = self.observations_created,
            dry_run = self.dry_run,
            duration_ms = self.duration.as_millis() as u64,
            "CSV import completed"
        );

        for error in &self.errors {
            tracing::warn!(
                row = error.row_number,
                patient_identifier = ?error.patient_identifier,
                message = %error.message,
                "CSV row failed"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_outcome() {
        let mut summary = ImportSummary::new(false);
        assert!(summary.is_successful());
        assert!(!summary.is_partial());

        summary.rows_imported = 2;
        summary.add_error(RowErrorDetail::new(3, "bad date"));
        assert!(!summary.is_successful());
        assert!(summary.is_partial());
        assert_eq!(summary.rows_failed, 1);
    }
}
