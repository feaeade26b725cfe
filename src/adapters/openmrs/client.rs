//! OpenMRS REST implementation of the service traits

use super::models::{
    concept_payload, encounter_payload, RestConcept, RestEncounter, RestResults,
    TransactionResponse,
};
use super::traits::{ConceptService, EncounterService, EncounterTransactionService};
use crate::config::{basic_auth_header, OpenMrsConfig};
use crate::core::transaction::EncounterTransaction;
use crate::domain::{BridgeError, Concept, Encounter, OpenMrsError, Result};
use async_trait::async_trait;
use reqwest::{Client, ClientBuilder, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;

const REST_PREFIX: &str = "/ws/rest/v1";

/// OpenMRS REST client using Basic authentication
///
/// # Example
///
/// ```no_run
/// use bahmni_bridge::adapters::openmrs::{EncounterService, OpenMrsRestClient};
/// use bahmni_bridge::config::{secret_string, OpenMrsConfig};
///
/// # async fn example() -> bahmni_bridge::domain::Result<()> {
/// let config = OpenMrsConfig {
///     base_url: "https://emr.example.org/openmrs".to_string(),
///     username: "admin".to_string(),
///     password: secret_string("Admin123".to_string()),
///     timeout_seconds: 30,
///     tls_verify: true,
/// };
/// let client = OpenMrsRestClient::new(&config)?;
/// let encounter = client.get_encounter_by_uuid("12-34-56-78").await?;
/// # Ok(())
/// # }
/// ```
pub struct OpenMrsRestClient {
    base_url: String,
    client: Client,
    auth_header: String,
}

impl OpenMrsRestClient {
    /// Builds the HTTP client from configuration
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the TLS backend cannot be initialised.
    pub fn new(config: &OpenMrsConfig) -> Result<Self> {
        let mut client_builder = ClientBuilder::new()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .connect_timeout(Duration::from_secs(30));

        if !config.tls_verify {
            client_builder = client_builder.danger_accept_invalid_certs(true);
        }

        let client = client_builder.build().map_err(|e| {
            BridgeError::Configuration(format!("Failed to build OpenMRS HTTP client: {e}"))
        })?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client,
            auth_header: basic_auth_header(&config.username, &config.password),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, resource: &str) -> String {
        format!("{}{REST_PREFIX}/{resource}", self.base_url)
    }

    async fn send(&self, request: RequestBuilder, url: &str) -> Result<Response> {
        request
            .header("Authorization", &self.auth_header)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| OpenMrsError::ConnectionFailed(format!("{url}: {e}")).into())
    }

    /// Maps non-success responses to errors; 404 is returned as `Ok(None)`
    async fn check(response: Response, url: &str) -> Result<Option<Response>> {
        let status = response.status();
        if status.is_success() {
            return Ok(Some(response));
        }
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let body = response.text().await.unwrap_or_default();
        tracing::warn!(url = %url, status = status.as_u16(), "OpenMRS request failed");
        let err = if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            OpenMrsError::AuthenticationFailed(format!("{status} from {url}"))
        } else if status.is_server_error() {
            OpenMrsError::ServerError {
                status: status.as_u16(),
                message: body,
            }
        } else {
            OpenMrsError::ClientError {
                status: status.as_u16(),
                message: body,
            }
        };
        Err(err.into())
    }

    async fn decode<T: DeserializeOwned>(response: Response, url: &str) -> Result<T> {
        response
            .json::<T>()
            .await
            .map_err(|e| OpenMrsError::InvalidResponse(format!("{url}: {e}")).into())
    }

    async fn get_optional<T: DeserializeOwned>(&self, url: &str) -> Result<Option<T>> {
        let response = self.send(self.client.get(url), url).await?;
        match Self::check(response, url).await? {
            Some(response) => Ok(Some(Self::decode(response, url).await?)),
            None => Ok(None),
        }
    }

    /// POSTs to `{resource}/{uuid}`, falling back to `{resource}` when the
    /// object does not exist yet
    async fn upsert<T: DeserializeOwned>(
        &self,
        resource: &str,
        uuid: &str,
        body: &serde_json::Value,
    ) -> Result<T> {
        let update_url = self.url(&format!("{resource}/{uuid}"));
        let response = self
            .send(self.client.post(&update_url).json(body), &update_url)
            .await?;
        if let Some(response) = Self::check(response, &update_url).await? {
            return Self::decode(response, &update_url).await;
        }

        tracing::debug!(resource = resource, uuid = uuid, "Creating new OpenMRS resource");
        let create_url = self.url(resource);
        let response = self
            .send(self.client.post(&create_url).json(body), &create_url)
            .await?;
        match Self::check(response, &create_url).await? {
            Some(response) => Self::decode(response, &create_url).await,
            None => Err(OpenMrsError::SaveFailed {
                resource: resource.to_string(),
                message: format!("{create_url} returned 404"),
            }
            .into()),
        }
    }
}

#[async_trait]
impl EncounterService for OpenMrsRestClient {
    async fn get_encounter_by_uuid(&self, uuid: &str) -> Result<Option<Encounter>> {
        let url = format!("{}?v=full", self.url(&format!("encounter/{uuid}")));
        let encounter: Option<RestEncounter> = self.get_optional(&url).await?;
        Ok(encounter.map(Encounter::from))
    }

    async fn save_encounter(&self, encounter: &Encounter) -> Result<Encounter> {
        let body = encounter_payload(encounter);
        let saved: RestEncounter = self.upsert("encounter", &encounter.uuid, &body).await?;
        tracing::info!(encounter_uuid = %saved.uuid, "Saved encounter to OpenMRS");
        Ok(Encounter::from(saved))
    }
}

#[async_trait]
impl ConceptService for OpenMrsRestClient {
    async fn get_concept_by_uuid(&self, uuid: &str) -> Result<Option<Concept>> {
        let url = format!("{}?v=full", self.url(&format!("concept/{uuid}")));
        let concept: Option<RestConcept> = self.get_optional(&url).await?;
        Ok(concept.map(Concept::from))
    }

    async fn get_concept_by_name(&self, name: &str) -> Result<Option<Concept>> {
        let request = self
            .client
            .get(self.url("concept"))
            .query(&[("q", name), ("v", "full")]);
        let url = self.url("concept");
        let response = self.send(request, &url).await?;
        let results: RestResults<RestConcept> = match Self::check(response, &url).await? {
            Some(response) => Self::decode(response, &url).await?,
            None => return Ok(None),
        };

        Ok(results
            .results
            .into_iter()
            .map(Concept::from)
            .find(|concept| !concept.retired && concept.name.eq_ignore_ascii_case(name)))
    }

    async fn save_concept(&self, concept: &Concept) -> Result<Concept> {
        let body = concept_payload(concept);
        let saved: RestConcept = self.upsert("concept", &concept.uuid, &body).await?;
        tracing::info!(concept_uuid = %saved.uuid, "Saved concept to OpenMRS");
        Ok(Concept::from(saved))
    }
}

#[async_trait]
impl EncounterTransactionService for OpenMrsRestClient {
    async fn save_transaction(&self, transaction: &EncounterTransaction) -> Result<String> {
        let url = self.url("bahmnicore/bahmniencounter");
        let response = self
            .send(self.client.post(&url).json(transaction), &url)
            .await?;
        let response = Self::check(response, &url)
            .await?
            .ok_or_else(|| OpenMrsError::SaveFailed {
                resource: "encounter transaction".to_string(),
                message: format!("{url} returned 404"),
            })?;
        let saved: TransactionResponse = Self::decode(response, &url).await?;
        Ok(saved.encounter_uuid)
    }
}
