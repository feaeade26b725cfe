//! Lab test reference data worker
//!
//! Mirrors OpenELIS test definitions into the OpenMRS concept dictionary.
//! The concept uuid is the OpenELIS test id.

use crate::adapters::elis::LabSystemClient;
use crate::adapters::openmrs::ConceptService;
use crate::domain::{Concept, ConceptDatatype, FeedEvent, LabTest, Result};
use std::sync::Arc;

/// Concept class given to mirrored lab tests
pub const LAB_TEST_CONCEPT_CLASS: &str = "LabTest";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabTestOutcome {
    Created,
    Updated,
    Unchanged,
}

pub struct LabTestEventWorker {
    lab_system: Arc<dyn LabSystemClient>,
    concepts: Arc<dyn ConceptService>,
    dry_run: bool,
}

impl LabTestEventWorker {
    pub fn new(lab_system: Arc<dyn LabSystemClient>, concepts: Arc<dyn ConceptService>) -> Self {
        Self {
            lab_system,
            concepts,
            dry_run: false,
        }
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Fetches the test named by the event and creates or updates its concept
    pub async fn process(&self, event: &FeedEvent) -> Result<LabTestOutcome> {
        let path = event.resource_path()?;
        let lab_test = self.lab_system.get_lab_test(&path).await?;

        let existing = self.concepts.get_concept_by_uuid(&lab_test.id).await?;
        let (concept, outcome) = match existing {
            None => (concept_for(&lab_test), LabTestOutcome::Created),
            Some(existing) => {
                let updated = apply_lab_test(existing.clone(), &lab_test);
                if updated == existing {
                    tracing::debug!(test_id = %lab_test.id, "Lab test concept unchanged");
                    return Ok(LabTestOutcome::Unchanged);
                }
                (updated, LabTestOutcome::Updated)
            }
        };

        if self.dry_run {
            tracing::info!(test_id = %lab_test.id, outcome = ?outcome, "Dry run: skipping concept save");
        } else {
            self.concepts.save_concept(&concept).await?;
            tracing::info!(test_id = %lab_test.id, outcome = ?outcome, "Lab test concept saved");
        }
        Ok(outcome)
    }
}

fn datatype_for(lab_test: &LabTest) -> ConceptDatatype {
    if lab_test.has_numeric_result() {
        ConceptDatatype::Numeric
    } else {
        ConceptDatatype::Text
    }
}

fn concept_for(lab_test: &LabTest) -> Concept {
    apply_lab_test(
        Concept::new(lab_test.id.as_str(), lab_test.name.as_str(), datatype_for(lab_test)),
        lab_test,
    )
}

fn apply_lab_test(mut concept: Concept, lab_test: &LabTest) -> Concept {
    concept.name = lab_test.name.trim().to_string();
    concept.short_name = lab_test
        .short_name
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string);
    concept.description = lab_test.description.clone();
    concept.datatype = datatype_for(lab_test);
    concept.concept_class = Some(LAB_TEST_CONCEPT_CLASS.to_string());
    concept.retired = false;
    concept
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lab_test(result_type: &str) -> LabTest {
        LabTest {
            id: "t-1".to_string(),
            name: " Haemoglobin ".to_string(),
            description: Some("Blood haemoglobin".to_string()),
            short_name: Some("".to_string()),
            result_type: Some(result_type.to_string()),
            sample: None,
            department: None,
        }
    }

    #[test]
    fn test_concept_for_numeric_test() {
        let concept = concept_for(&lab_test("N"));
        assert_eq!(concept.uuid, "t-1");
        assert_eq!(concept.name, "Haemoglobin");
        assert!(concept.short_name.is_none());
        assert_eq!(concept.datatype, ConceptDatatype::Numeric);
        assert_eq!(concept.concept_class.as_deref(), Some("LabTest"));
    }

    #[test]
    fn test_free_text_result_is_text() {
        assert_eq!(concept_for(&lab_test("R")).datatype, ConceptDatatype::Text);
    }

    #[test]
    fn test_apply_keeps_absolute_range() {
        let mut existing = concept_for(&lab_test("N"));
        existing.hi_absolute = Some(25.0);
        let updated = apply_lab_test(existing, &lab_test("N"));
        assert_eq!(updated.hi_absolute, Some(25.0));
    }
}
