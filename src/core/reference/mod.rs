//! Reference data synchronisation from OpenELIS

pub mod lab_test_worker;

pub use lab_test_worker::{LabTestEventWorker, LabTestOutcome};
