//! Accession event worker
//!
//! Reconciles one OpenELIS accession with its local lab encounter:
//!
//! 1. Fetch the accession named by the feed event.
//! 2. Look up the encounter whose uuid is the accession uuid.
//! 3. Create it when missing; otherwise apply the order diff, saving only
//!    when there is a difference.
//! 4. Re-read the encounter and record results it does not hold yet.

use super::diff::AccessionDiff;
use super::mapper::AccessionMapper;
use crate::adapters::elis::LabSystemClient;
use crate::adapters::openmrs::EncounterService;
use crate::domain::{Encounter, FeedEvent, Result};
use std::sync::Arc;

/// What the worker did with the order set
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessionOutcome {
    /// No encounter existed; one was created
    Created,
    /// Orders were added or voided
    Updated { added: usize, removed: usize },
    /// Orders already matched the accession
    Unchanged,
}

/// Result of processing one accession event
#[derive(Debug, Clone)]
pub struct ProcessedAccession {
    pub accession_uuid: String,
    pub outcome: AccessionOutcome,
    /// Result observations written after the order decision
    pub results_recorded: usize,
    /// Encounter as read back after the order decision
    pub encounter: Option<Encounter>,
}

/// Processes accession feed events
pub struct AccessionEventWorker {
    lab_system: Arc<dyn LabSystemClient>,
    encounters: Arc<dyn EncounterService>,
    mapper: AccessionMapper,
    dry_run: bool,
}

impl AccessionEventWorker {
    pub fn new(
        lab_system: Arc<dyn LabSystemClient>,
        encounters: Arc<dyn EncounterService>,
        mapper: AccessionMapper,
    ) -> Self {
        Self {
            lab_system,
            encounters,
            mapper,
            dry_run: false,
        }
    }

    /// Skip every save, still performing reads
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Processes one event
    ///
    /// # Errors
    ///
    /// Fetch, mapping and save failures are returned unchanged. Nothing is
    /// retried here; the feed client redelivers the event.
    pub async fn process(&self, event: &FeedEvent) -> Result<ProcessedAccession> {
        let path = event.resource_path()?;
        let accession = self.lab_system.get_accession(&path).await?;
        let accession_uuid = accession.accession_uuid.as_str();

        tracing::info!(
            event_id = %event.id,
            accession_uuid = accession_uuid,
            "Processing accession event"
        );

        let previous = self.encounters.get_encounter_by_uuid(accession_uuid).await?;
        let outcome = match previous {
            None => {
                let encounter = self.mapper.map_to_new_encounter(&accession)?;
                self.save(&encounter).await?;
                AccessionOutcome::Created
            }
            Some(previous) => {
                let diff = AccessionDiff::between(&accession, &previous);
                if diff.has_difference() {
                    let added = diff.added_test_details().len();
                    let removed = diff.removed_test_details().len();
                    let updated =
                        self.mapper
                            .add_or_void_order_differences(&accession, &diff, previous)?;
                    self.save(&updated).await?;
                    AccessionOutcome::Updated { added, removed }
                } else {
                    tracing::debug!(accession_uuid = accession_uuid, "Orders already in sync");
                    AccessionOutcome::Unchanged
                }
            }
        };

        let mut encounter = self.encounters.get_encounter_by_uuid(accession_uuid).await?;
        let mut results_recorded = 0;
        if let Some(ref mut current) = encounter {
            results_recorded = self.mapper.record_results(&accession, current);
            if results_recorded > 0 {
                self.save(current).await?;
            }
        } else if !(self.dry_run && outcome == AccessionOutcome::Created) {
            // only a dry-run create leaves nothing to read back
            tracing::warn!(
                accession_uuid = accession_uuid,
                "Encounter not found after saving accession"
            );
        }

        tracing::info!(
            accession_uuid = accession_uuid,
            outcome = ?outcome,
            results_recorded = results_recorded,
            "Accession event processed"
        );

        Ok(ProcessedAccession {
            accession_uuid: accession_uuid.to_string(),
            outcome,
            results_recorded,
            encounter,
        })
    }

    async fn save(&self, encounter: &Encounter) -> Result<()> {
        if self.dry_run {
            tracing::info!(encounter_uuid = %encounter.uuid, "Dry run: skipping encounter save");
            return Ok(());
        }
        self.encounters.save_encounter(encounter).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::openmrs::InMemoryOpenMrs;
    use crate::config::LabConfig;
    use crate::domain::ids::ResourcePath;
    use crate::domain::{AccessionUuid, ElisError, LabTest, OpenElisAccession, OpenElisTestDetail};
    use async_trait::async_trait;

    struct StubLabSystem {
        accession: OpenElisAccession,
    }

    #[async_trait]
    impl LabSystemClient for StubLabSystem {
        async fn get_accession(&self, _path: &ResourcePath) -> Result<OpenElisAccession> {
            Ok(self.accession.clone())
        }

        async fn get_lab_test(&self, path: &ResourcePath) -> Result<LabTest> {
            Err(ElisError::ClientError {
                status: 404,
                message: path.to_string(),
            }
            .into())
        }

        fn base_url(&self) -> &str {
            "http://stub"
        }
    }

    fn event() -> FeedEvent {
        FeedEvent::new("id", "/openelis/accession/acc-1", "title", "feedUri")
    }

    fn worker(details: Vec<OpenElisTestDetail>, store: Arc<InMemoryOpenMrs>) -> AccessionEventWorker {
        let accession = OpenElisAccession::new(AccessionUuid::new("acc-1").unwrap(), "patient-1")
            .with_test_details(details);
        AccessionEventWorker::new(
            Arc::new(StubLabSystem { accession }),
            store,
            AccessionMapper::new(LabConfig::default()),
        )
    }

    #[tokio::test]
    async fn test_dry_run_skips_saves() {
        let store = Arc::new(InMemoryOpenMrs::new());
        let processed = worker(vec![OpenElisTestDetail::new("test1")], store.clone())
            .with_dry_run(true)
            .process(&event())
            .await
            .unwrap();

        assert_eq!(processed.outcome, AccessionOutcome::Created);
        assert!(processed.encounter.is_none());
        assert_eq!(store.encounter_saves(), 0);
        assert_eq!(store.encounter_lookups(), 2);
    }

    #[tokio::test]
    async fn test_dry_run_update_reads_back_stored_encounter() {
        let store = Arc::new(InMemoryOpenMrs::new());
        worker(vec![OpenElisTestDetail::new("test1")], store.clone())
            .process(&event())
            .await
            .unwrap();

        let processed = worker(
            vec![OpenElisTestDetail::new("test1"), OpenElisTestDetail::new("test2")],
            store.clone(),
        )
        .with_dry_run(true)
        .process(&event())
        .await
        .unwrap();

        assert_eq!(
            processed.outcome,
            AccessionOutcome::Updated {
                added: 1,
                removed: 0
            }
        );
        let encounter = processed.encounter.unwrap();
        assert!(!encounter.has_active_order_for("test2"));
        assert_eq!(store.encounter_saves(), 1);
    }

    #[tokio::test]
    async fn test_results_recorded_after_orders_in_sync() {
        let store = Arc::new(InMemoryOpenMrs::new());
        worker(vec![OpenElisTestDetail::new("test1")], store.clone())
            .process(&event())
            .await
            .unwrap();
        assert_eq!(store.encounter_saves(), 1);

        let processed = worker(
            vec![OpenElisTestDetail::new("test1").with_result("12", "2014-01-30T12:00:00Z")],
            store.clone(),
        )
        .process(&event())
        .await
        .unwrap();

        assert_eq!(processed.outcome, AccessionOutcome::Unchanged);
        assert_eq!(processed.results_recorded, 1);
        assert_eq!(store.encounter_saves(), 2);
        let stored = store.encounter("acc-1").await.unwrap();
        assert_eq!(stored.obs[0].value_text.as_deref(), Some("12"));
    }

    #[tokio::test]
    async fn test_bad_event_content_is_rejected() {
        let store = Arc::new(InMemoryOpenMrs::new());
        let bad_event = FeedEvent::new("id", "  ", "title", "feedUri");
        let result = worker(vec![], store.clone()).process(&bad_event).await;
        assert!(result.is_err());
        assert_eq!(store.encounter_lookups(), 0);
    }
}
