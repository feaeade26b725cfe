//! OpenELIS integration
//!
//! Workers receive only the relative resource path from the feed. They fetch
//! the current state of that resource through [`LabSystemClient`].

pub mod client;

pub use client::OpenElisClient;

use crate::domain::ids::ResourcePath;
use crate::domain::{LabTest, OpenElisAccession, Result};
use async_trait::async_trait;

/// Read access to the external lab information system
#[async_trait]
pub trait LabSystemClient: Send + Sync {
    /// Fetches the accession snapshot named by a feed event
    ///
    /// # Errors
    ///
    /// Returns [`crate::domain::ElisError`] wrapped in a bridge error when the
    /// request fails or the body is not an accession.
    async fn get_accession(&self, path: &ResourcePath) -> Result<OpenElisAccession>;

    /// Fetches a lab test definition named by a feed event
    async fn get_lab_test(&self, path: &ResourcePath) -> Result<LabTest>;

    /// Base URL resource paths are resolved against
    fn base_url(&self) -> &str;
}
