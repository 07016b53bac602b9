/// HTTP implementation of the backend
///
/// Wraps a `reqwest::Client` together with the base URL and optional bearer
/// token taken from the configuration.

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use super::{Backend, BackendError, HttpMethod, ResponseBody};
use crate::config::Config;

/// Strapi REST client
pub struct BackendClient {
    inner: reqwest::Client,
    base_url: String,
    api_token: Option<String>,
}

impl BackendClient {
    /// Create a client with default settings
    pub fn new(config: &Config) -> Result<Self, BackendError> {
        let inner = reqwest::Client::builder()
            .user_agent(concat!("strapi-mcp/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self::with_http_client(config, inner))
    }

    /// Create a client around an already configured `reqwest::Client`
    pub fn with_http_client(config: &Config, inner: reqwest::Client) -> Self {
        Self {
            inner,
            base_url: config.base_url().to_string(),
            api_token: config.api_token().map(str::to_string),
        }
    }

    fn builder(&self, method: HttpMethod, url: &str) -> reqwest::RequestBuilder {
        match method {
            HttpMethod::Get => self.inner.get(url),
            HttpMethod::Post => self.inner.post(url),
            HttpMethod::Put => self.inner.put(url),
            HttpMethod::Delete => self.inner.delete(url),
        }
    }
}

#[async_trait]
impl Backend for BackendClient {
    async fn request(
        &self,
        path: &str,
        method: HttpMethod,
        body: Option<Value>,
    ) -> Result<Value, BackendError> {
        let url = format!("{}{}", self.base_url, path);
        debug!("{} {}", method, url);

        let mut req = self
            .builder(method, &url)
            .header(reqwest::header::CONTENT_TYPE, "application/json");

        if let Some(token) = &self.api_token {
            req = req.bearer_auth(token);
        }

        if let Some(data) = body {
            req = req.json(&data);
        }

        let response = req.send().await?;
        let status = response.status();
        let text = response.text().await?;
        let decoded = ResponseBody::decode(text).into_value();

        if !status.is_success() {
            debug!("{} {} returned {}", method, url, status);
            return Err(BackendError::Status {
                status: status.as_u16(),
                body: decoded,
            });
        }

        Ok(decoded)
    }
}
