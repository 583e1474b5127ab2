//! Remote resolver backed by `reqwest`.
//!
//! # Design
//! - The payload is POSTed as a flat JSON object of strings.
//! - The response is `{ "url": string | null }`; missing, null, or blank means no destination.
//! - The timeout is applied per request and again around the whole exchange, so the
//!   call returns by the deadline even if the body stalls.

use std::time::Duration;

use async_trait::async_trait;
use portico_bootstrap::{Payload, RemoteResolver, ResolverError};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, instrument};
use url::Url;

/// User agent sent with every bootstrap request.
pub const USER_AGENT: &str = concat!("portico/", env!("CARGO_PKG_VERSION"));

/// Body returned by the configuration endpoint.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct DestinationResponse {
    /// Server-decided destination.
    #[serde(default)]
    pub url: Option<String>,
}

impl DestinationResponse {
    /// Destination with blank values folded into `None`.
    #[must_use]
    pub fn into_destination(self) -> Option<String> {
        self.url
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty())
    }
}

/// Resolver that asks the configuration endpoint for a destination.
#[derive(Debug, Clone)]
pub struct HttpRemoteResolver {
    client: Client,
    endpoint: Url,
}

impl HttpRemoteResolver {
    /// Build a resolver with its own HTTP client.
    ///
    /// # Errors
    ///
    /// Returns `ResolverError::Transport` when the HTTP client cannot be constructed.
    pub fn new(endpoint: Url) -> Result<Self, ResolverError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|err| ResolverError::Transport {
                endpoint: endpoint.to_string(),
                source: Box::new(err),
            })?;
        Ok(Self::with_client(client, endpoint))
    }

    /// Build a resolver around an existing client.
    #[must_use]
    pub const fn with_client(client: Client, endpoint: Url) -> Self {
        Self { client, endpoint }
    }

    async fn exchange(
        &self,
        payload: &Payload,
        timeout: Duration,
    ) -> Result<Option<String>, ResolverError> {
        let endpoint = self.endpoint.to_string();
        let response = self
            .client
            .post(self.endpoint.clone())
            .timeout(timeout)
            .json(payload)
            .send()
            .await
            .map_err(|err| classify_transport(&endpoint, timeout, err))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ResolverError::Status {
                endpoint,
                status: status.as_u16(),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|err| classify_transport(&endpoint, timeout, err))?;
        let body: DestinationResponse =
            serde_json::from_slice(&bytes).map_err(|_| ResolverError::InvalidResponse {
                endpoint,
                reason: "body_not_destination_json",
            })?;
        Ok(body.into_destination())
    }
}

#[async_trait]
impl RemoteResolver for HttpRemoteResolver {
    #[instrument(name = "remote.fetch_destination", skip(self, payload), fields(endpoint = %self.endpoint))]
    async fn fetch_destination(
        &self,
        payload: &Payload,
        timeout: Duration,
    ) -> Result<Option<String>, ResolverError> {
        let destination = tokio::time::timeout(timeout, self.exchange(payload, timeout))
            .await
            .map_err(|_| ResolverError::Timeout { timeout })??;
        debug!(
            has_destination = destination.is_some(),
            "remote resolution completed"
        );
        Ok(destination)
    }
}

fn classify_transport(endpoint: &str, timeout: Duration, err: reqwest::Error) -> ResolverError {
    if err.is_timeout() {
        ResolverError::Timeout { timeout }
    } else {
        ResolverError::Transport {
            endpoint: endpoint.to_string(),
            source: Box::new(err),
        }
    }
}
