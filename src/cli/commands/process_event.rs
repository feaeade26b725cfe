//! Process-event command implementation
//!
//! Runs a single OpenELIS feed event through the matching worker. Feed
//! polling is owned by the atom feed client; this command is the hook it
//! (or an operator replaying an event) calls.

use super::load_valid_config;
use crate::adapters::elis::OpenElisClient;
use crate::adapters::openmrs::create_openmrs_services;
use crate::cli::{exit_code_for, EXIT_CONFIG, EXIT_CONNECTION, EXIT_SUCCESS};
use crate::core::accession::{AccessionEventWorker, AccessionMapper, AccessionOutcome};
use crate::core::reference::LabTestEventWorker;
use crate::domain::FeedEvent;
use crate::{log_error_with_context, log_event_start};
use clap::{Args, ValueEnum};
use std::sync::Arc;

/// Feed the event came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum EventKind {
    /// Patient accession feed
    Accession,
    /// Lab test reference data feed
    LabTest,
}

impl EventKind {
    fn as_str(self) -> &'static str {
        match self {
            EventKind::Accession => "accession",
            EventKind::LabTest => "lab-test",
        }
    }
}

/// Arguments for the process-event command
#[derive(Args, Debug)]
pub struct ProcessEventArgs {
    /// Resource path carried by the event, relative to the OpenELIS base URL
    #[arg(long)]
    pub content: String,

    /// Feed entry id, used in logs
    #[arg(long, default_value = "manual")]
    pub id: String,

    /// Title of the feed entry
    #[arg(long, default_value = "")]
    pub title: String,

    #[arg(long, value_enum, default_value_t = EventKind::Accession)]
    pub kind: EventKind,

    /// Read everything, save nothing
    #[arg(long)]
    pub dry_run: bool,
}

impl ProcessEventArgs {
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let Some(config) = load_valid_config(config_path) else {
            return Ok(EXIT_CONFIG);
        };
        let dry_run = self.dry_run || config.application.dry_run;
        if dry_run {
            println!("🔍 DRY RUN MODE - nothing will be saved to OpenMRS");
        }

        let (services, lab_system) = match (
            create_openmrs_services(&config),
            OpenElisClient::new(&config.elis),
        ) {
            (Ok(services), Ok(client)) => (services, Arc::new(client)),
            (Err(e), _) | (_, Err(e)) => {
                log_error_with_context!(&e, "Failed to create service clients");
                eprintln!("❌ Failed to initialize clients: {e}");
                return Ok(EXIT_CONNECTION);
            }
        };

        let event = FeedEvent::new(
            self.id.as_str(),
            self.content.as_str(),
            self.title.as_str(),
            config.elis.base_url.as_str(),
        );
        log_event_start!(self.kind.as_str(), event.id, event.content);

        let outcome = match self.kind {
            EventKind::Accession => {
                let worker = AccessionEventWorker::new(
                    lab_system,
                    services.encounters,
                    AccessionMapper::new(config.lab.clone()),
                )
                .with_dry_run(dry_run);
                worker.process(&event).await.map(|processed| {
                    let summary = match processed.outcome {
                        AccessionOutcome::Created => "encounter created".to_string(),
                        AccessionOutcome::Updated { added, removed } => {
                            format!("{added} order(s) added, {removed} order(s) voided")
                        }
                        AccessionOutcome::Unchanged => "orders already in sync".to_string(),
                    };
                    format!(
                        "Accession {}: {summary}, {} result(s) recorded",
                        processed.accession_uuid, processed.results_recorded
                    )
                })
            }
            EventKind::LabTest => {
                let worker =
                    LabTestEventWorker::new(lab_system, services.concepts).with_dry_run(dry_run);
                worker
                    .process(&event)
                    .await
                    .map(|outcome| format!("Lab test concept {outcome:?}"))
            }
        };

        match outcome {
            Ok(message) => {
                println!("✅ {message}");
                Ok(EXIT_SUCCESS)
            }
            Err(e) => {
                log_error_with_context!(&e, "Feed event processing failed");
                eprintln!("❌ Event {} failed: {e}", event.id);
                Ok(exit_code_for(&e))
            }
        }
    }
}
