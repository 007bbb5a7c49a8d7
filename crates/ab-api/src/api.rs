use reqwest::{Client, Response, Url};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::{
    api_interfaces::message,
    constants::{DEFAULT_ADDRESSES_ENDPOINT, JSON_CONTENT_TYPE},
    error::{ConfigError, RequestError},
    record::{AddressChanges, AddressId, AddressRecord},
    util::default_http_client,
};

/// Where the address collection lives.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EndpointConfig {
    pub url: String,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_ADDRESSES_ENDPOINT.to_string(),
        }
    }
}

impl EndpointConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.collection_url().map(|_| ())
    }

    /// The parsed collection URL, without a trailing slash.
    pub fn collection_url(&self) -> Result<Url, ConfigError> {
        let mut url = Url::parse(&self.url)
            .map_err(|e| ConfigError::InvalidEndpoint(self.url.clone(), e.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::UnsupportedScheme(self.url.clone()));
        }
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty();
        }
        Ok(url)
    }
}

/// Stateless access to the address collection. One method per HTTP call;
/// nothing is cached between calls.
#[derive(Clone, Debug)]
pub struct AddressApi {
    http_client: Client,
    endpoint: EndpointConfig,
    collection: Url,
}

impl AddressApi {
    pub fn new(http_client: Client, endpoint: EndpointConfig) -> Result<Self, ConfigError> {
        let collection = endpoint.collection_url()?;
        Ok(Self {
            http_client,
            endpoint,
            collection,
        })
    }

    /// Talk to the default endpoint with the default HTTP client.
    pub fn default_endpoint() -> Result<Self, ConfigError> {
        Self::new(default_http_client(), EndpointConfig::default())
    }

    pub fn endpoint(&self) -> &EndpointConfig {
        &self.endpoint
    }

    /// The id becomes a single escaped path segment, so reserved characters
    /// in it cannot reach the query or fragment.
    fn item(&self, id: &AddressId) -> Url {
        let mut url = self.collection.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.push(&id.to_string());
        }
        url
    }

    pub async fn list(&self) -> Result<Vec<AddressRecord>, RequestError> {
        let url = self.collection.clone();
        debug!(%url, "listing addresses");
        let response = self.http_client.get(url).send().await?;
        read_json(response).await
    }

    pub async fn get(&self, id: &AddressId) -> Result<AddressRecord, RequestError> {
        let url = self.item(id);
        debug!(%url, "fetching address");
        let response = self.http_client.get(url).send().await?;
        read_json(response).await
    }

    /// Returns the service's confirmation message.
    pub async fn create(&self, draft: &AddressRecord) -> Result<String, RequestError> {
        let url = self.collection.clone();
        let body = serde_json::to_string(draft).map_err(RequestError::Serialize)?;
        debug!(%url, "creating address");
        let response = self
            .http_client
            .post(url)
            .header("Content-Type", JSON_CONTENT_TYPE)
            .body(body)
            .send()
            .await?;
        let parsed: message::Response = read_json(response).await?;
        Ok(parsed.message)
    }

    pub async fn update(
        &self,
        id: &AddressId,
        changes: &AddressChanges,
    ) -> Result<String, RequestError> {
        let url = self.item(id);
        let body = serde_json::to_string(changes).map_err(RequestError::Serialize)?;
        debug!(%url, "updating address");
        let response = self
            .http_client
            .put(url)
            .header("Content-Type", JSON_CONTENT_TYPE)
            .body(body)
            .send()
            .await?;
        let parsed: message::Response = read_json(response).await?;
        Ok(parsed.message)
    }

    pub async fn delete(&self, id: &AddressId) -> Result<String, RequestError> {
        let url = self.item(id);
        debug!(%url, "deleting address");
        let response = self.http_client.delete(url).send().await?;
        let parsed: message::Response = read_json(response).await?;
        Ok(parsed.message)
    }
}

/// Check the status, then parse the body as JSON whatever its declared type.
async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, RequestError> {
    let status = response.status();
    let body = response.text().await.map_err(RequestError::ResponseBody)?;
    if !status.is_success() {
        return Err(RequestError::Status { status, body });
    }
    serde_json::from_str(&body).map_err(RequestError::Parse)
}
