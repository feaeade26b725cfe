//! Domain models and types for the bridge.
//!
//! # Overview
//!
//! - **OpenELIS payloads** ([`OpenElisAccession`], [`OpenElisTestDetail`], [`LabTest`])
//! - **OpenMRS objects** ([`Encounter`], [`TestOrder`], [`Obs`], [`Concept`])
//! - **Feed events** ([`FeedEvent`])
//! - **Error types** ([`BridgeError`], [`ElisError`], [`OpenMrsError`], [`CsvImportError`])
//! - **Result type alias** ([`Result`])
//!
//! # Correlation
//!
//! A lab encounter always carries the uuid of the accession it was built from:
//!
//! ```rust
//! use bahmni_bridge::domain::{AccessionUuid, Encounter, EncounterType};
//!
//! let accession_uuid = AccessionUuid::new("12-34-56-78").unwrap();
//! let encounter = Encounter::new(accession_uuid.as_str(), EncounterType::named("LAB_RESULT"));
//! assert_eq!(encounter.uuid, accession_uuid.as_str());
//! ```

pub mod accession;
pub mod concept;
pub mod encounter;
pub mod errors;
pub mod event;
pub mod ids;
pub mod result;

pub use accession::{parse_elis_date_time, OpenElisAccession, OpenElisTestDetail};
pub use concept::{Concept, ConceptDatatype};
pub use encounter::{ConceptRef, Encounter, EncounterType, Obs, TestOrder};
pub use errors::{BridgeError, CsvImportError, ElisError, OpenMrsError, RowErrorDetail};
pub use event::FeedEvent;
pub use ids::{AccessionUuid, ResourcePath};
pub use lab_test::{Department, LabTest, Sample};
pub use result::Result;
