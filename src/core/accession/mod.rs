//! OpenELIS accession handling
//!
//! - [`diff`] - added and canceled tests between an accession and its encounter
//! - [`mapper`] - pure accession to encounter mapping
//! - [`worker`] - the feed event worker tying fetch, diff and save together

pub mod diff;
pub mod mapper;
pub mod worker;

pub use diff::AccessionDiff;
pub use mapper::AccessionMapper;
pub use worker::{AccessionEventWorker, AccessionOutcome, ProcessedAccession};
