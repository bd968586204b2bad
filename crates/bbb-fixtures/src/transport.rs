//! Mock BigBlueButton server transport.
//!
//! Every fixture that touches the conferencing side is a single GET against
//! the mock server's `backoffice/*` endpoints with a flat query string. The
//! reply is always XML.

use crate::config::Config;
use crate::errors::FixtureError;
use crate::flatten::{flatten, FlatParam, MockData};
use crate::xml::XmlNode;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, error, instrument, warn};

/// Connect timeout for mock server requests in seconds.
const MOCK_CONNECT_TIMEOUT_SECS: u64 = 5;

/// A request against one mock server endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockRequest {
    /// Endpoint path relative to the mock server base, e.g.
    /// `backoffice/createRecording`.
    pub endpoint: String,
    /// Query parameters in wire order.
    pub params: Vec<FlatParam>,
}

impl MockRequest {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            params: Vec::new(),
        }
    }

    /// Set a query parameter. An existing parameter of the same name keeps
    /// its position and takes the new value.
    pub fn set_param(&mut self, param: FlatParam) {
        match self.params.iter_mut().find(|p| p.name == param.name) {
            Some(existing) => existing.value = param.value,
            None => self.params.push(param),
        }
    }

    #[must_use]
    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_param(FlatParam::new(name, value));
        self
    }

    #[must_use]
    pub fn with_params(mut self, params: impl IntoIterator<Item = FlatParam>) -> Self {
        for param in params {
            self.set_param(param);
        }
        self
    }

    /// Append the flattened form of `data` after the current parameters.
    #[must_use]
    pub fn with_mock_data(self, data: &MockData) -> Self {
        self.with_params(flatten(data))
    }

    /// Look up a parameter value by name.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|p| p.name == name)
            .map(|p| p.value.as_str())
    }
}

/// Transport used by the fixture builder to reach the mock server.
#[async_trait::async_trait]
pub trait MockTransport: Send + Sync {
    /// Send `request` and return the parsed XML reply.
    async fn send(&self, request: MockRequest) -> Result<XmlNode, FixtureError>;
}

/// HTTP client for the mock server.
#[derive(Clone)]
pub struct MockServerClient {
    client: Client,
    base_url: String,
}

impl MockServerClient {
    /// Create a client for the mock server named in `config`.
    ///
    /// # Errors
    ///
    /// Returns `FixtureError::Transport` if the HTTP client cannot be built.
    pub fn new(config: &Config) -> Result<Self, FixtureError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .connect_timeout(Duration::from_secs(MOCK_CONNECT_TIMEOUT_SECS))
            .build()
            .map_err(|e| {
                error!(target: "bbb.fixtures.transport", error = %e, "Failed to build HTTP client");
                FixtureError::Transport(format!("Failed to build HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            base_url: config.mock_server_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Full URL of `endpoint`, without the query string.
    pub fn endpoint_url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint.trim_start_matches('/'))
    }
}

#[async_trait::async_trait]
impl MockTransport for MockServerClient {
    #[instrument(skip(self, request), fields(endpoint = %request.endpoint, params = request.params.len()))]
    async fn send(&self, request: MockRequest) -> Result<XmlNode, FixtureError> {
        let url = self.endpoint_url(&request.endpoint);
        let query: Vec<(&str, &str)> = request
            .params
            .iter()
            .map(|p| (p.name.as_str(), p.value.as_str()))
            .collect();

        debug!(target: "bbb.fixtures.transport", url = %url, "Sending mock server request");

        let response = self
            .client
            .get(&url)
            .query(&query)
            .send()
            .await
            .map_err(|e| {
                warn!(target: "bbb.fixtures.transport", error = %e, url = %url, "Mock server request failed");
                FixtureError::Transport(format!("Mock server is unreachable: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(target: "bbb.fixtures.transport", status = %status, url = %url, "Mock server returned an error status");
            return Err(FixtureError::Transport(format!(
                "Mock server returned {} for {}",
                status, request.endpoint
            )));
        }

        let body = response.text().await.map_err(|e| {
            warn!(target: "bbb.fixtures.transport", error = %e, "Failed to read mock server reply");
            FixtureError::Transport(format!("Failed to read mock server reply: {}", e))
        })?;

        XmlNode::parse(&body).inspect_err(|e| {
            warn!(target: "bbb.fixtures.transport", error = %e, endpoint = %request.endpoint, "Mock server reply could not be parsed");
        })
    }
}
