//! reqwest implementation of [`LabSystemClient`]

use super::LabSystemClient;
use crate::config::ElisConfig;
use crate::domain::ids::ResourcePath;
use crate::domain::{BridgeError, ElisError, LabTest, OpenElisAccession, Result};
use async_trait::async_trait;
use reqwest::{Client, ClientBuilder};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// HTTP client for OpenELIS
///
/// Requests are not retried; the feed client redelivers failed events.
///
/// # Example
///
/// ```no_run
/// use bahmni_bridge::adapters::elis::{LabSystemClient, OpenElisClient};
/// use bahmni_bridge::config::ElisConfig;
/// use bahmni_bridge::domain::ResourcePath;
///
/// # async fn example() -> bahmni_bridge::domain::Result<()> {
/// let client = OpenElisClient::new(&ElisConfig::default())?;
/// let path = ResourcePath::new("/openelis/ws/rest/accession/12-34-56-78").unwrap();
/// let accession = client.get_accession(&path).await?;
/// println!("{} tests", accession.test_details.len());
/// # Ok(())
/// # }
/// ```
pub struct OpenElisClient {
    base_url: String,
    client: Client,
}

impl OpenElisClient {
    /// Builds the HTTP client from configuration
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the TLS backend cannot be initialised.
    pub fn new(config: &ElisConfig) -> Result<Self> {
        let mut client_builder = ClientBuilder::new()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .connect_timeout(Duration::from_secs(30));

        if !config.tls_verify {
            client_builder = client_builder.danger_accept_invalid_certs(true);
        }

        let client = client_builder.build().map_err(|e| {
            BridgeError::Configuration(format!("Failed to build OpenELIS HTTP client: {e}"))
        })?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn url_for(&self, path: &ResourcePath) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &ResourcePath) -> Result<T> {
        let url = self.url_for(path);
        tracing::debug!(url = %url, "Fetching OpenELIS resource");

        let response = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ElisError::Timeout(format!("{url}: {e}"))
                } else {
                    ElisError::ConnectionFailed(format!("{url}: {e}"))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(url = %url, status = status.as_u16(), "OpenELIS request failed");
            let message = format!("GET {url} failed: {body}");
            let err = if status.is_server_error() {
                ElisError::ServerError {
                    status: status.as_u16(),
                    message,
                }
            } else {
                ElisError::ClientError {
                    status: status.as_u16(),
                    message,
                }
            };
            return Err(err.into());
        }

        response
            .json::<T>()
            .await
            .map_err(|e| ElisError::InvalidResponse(format!("{url}: {e}")).into())
    }
}

#[async_trait]
impl LabSystemClient for OpenElisClient {
    async fn get_accession(&self, path: &ResourcePath) -> Result<OpenElisAccession> {
        let accession: OpenElisAccession = self.get_json(path).await?;
        tracing::info!(
            accession_uuid = %accession.accession_uuid,
            test_count = accession.test_details.len(),
            "Fetched accession from OpenELIS"
        );
        Ok(accession)
    }

    async fn get_lab_test(&self, path: &ResourcePath) -> Result<LabTest> {
        let lab_test: LabTest = self.get_json(path).await?;
        tracing::info!(test_id = %lab_test.id, name = %lab_test.name, "Fetched lab test from OpenELIS");
        Ok(lab_test)
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }
}
