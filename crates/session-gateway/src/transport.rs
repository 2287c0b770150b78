//! Transport seam: performs one request against the backend.

use crate::{ApiRequest, ApiResponse, Method, TransportError};
use async_trait::async_trait;
use reqwest::Client;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Default request timeout.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Sends a single request and returns whatever the backend answered.
///
/// Implementations must return non-2xx statuses as responses. Only failures
/// where no response was received are errors.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, TransportError>;
}

/// Configuration for [`ReqwestTransport`].
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Base URL every request path is appended to (e.g. `http://localhost:8080/api`).
    pub base_url: Url,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Headers sent with every request unless the request overrides them.
    pub default_headers: BTreeMap<String, String>,
}

impl TransportConfig {
    pub fn new(base_url: Url) -> Self {
        let mut default_headers = BTreeMap::new();
        default_headers.insert("content-type".to_string(), "application/json".to_string());

        Self {
            base_url,
            timeout: DEFAULT_REQUEST_TIMEOUT,
            default_headers,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// HTTP transport backed by reqwest.
///
/// The session credential lives in the client's cookie store and is attached
/// to every request implicitly; nothing above this layer inspects it.
pub struct ReqwestTransport {
    client: Client,
    base_url: String,
    default_headers: BTreeMap<String, String>,
}

impl ReqwestTransport {
    pub fn new(config: TransportConfig) -> Result<Self, TransportError> {
        let client = Client::builder()
            .cookie_store(true)
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.as_str().trim_end_matches('/').to_string(),
            default_headers: config.default_headers,
        })
    }

    /// Resolve a request path against the base URL, keeping its query string.
    fn url_for(&self, path: &str) -> Result<Url, TransportError> {
        let url = if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        };
        Ok(Url::parse(&url)?)
    }
}

fn to_reqwest_method(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
        Method::Put => reqwest::Method::PUT,
        Method::Patch => reqwest::Method::PATCH,
        Method::Delete => reqwest::Method::DELETE,
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, TransportError> {
        let url = self.url_for(request.path())?;
        debug!(method = %request.method(), url = %url, "Sending request");

        let mut builder = self
            .client
            .request(to_reqwest_method(request.method()), url);

        for (name, value) in &self.default_headers {
            if !request.headers().contains_key(name) {
                builder = builder.header(name.as_str(), value.as_str());
            }
        }
        for (name, value) in request.headers() {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body() {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(TransportError::from_reqwest)?;

        let status = response.status().as_u16();
        let mut api_response = ApiResponse::new(status);
        for (name, value) in response.headers() {
            if let Ok(value) = value.to_str() {
                api_response = api_response.with_header(name.as_str(), value);
            }
        }
        let body = response
            .bytes()
            .await
            .map_err(TransportError::from_reqwest)?;

        debug!(status, bytes = body.len(), "Received response");
        Ok(api_response.with_body(body))
    }
}
