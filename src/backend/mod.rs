/// Access to the Strapi REST API
///
/// Tools talk to the CMS through the `Backend` trait so the transport can be
/// swapped out in tests. `BackendClient` is the HTTP implementation.

pub mod client;

pub use client::BackendClient;

use async_trait::async_trait;
use serde_json::{json, Value};
use thiserror::Error;

/// Errors that can occur while calling the backend
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Request failed with status {status}: {body}")]
    Status { status: u16, body: Value },
}

/// HTTP verbs used against the REST API
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A response body that may or may not be JSON
///
/// Error pages from proxies are often HTML, so a body that fails to decode is
/// kept as raw text instead of failing the call.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    Json(Value),
    Raw(String),
}

impl ResponseBody {
    /// Decode response text, falling back to the raw text
    ///
    /// An empty body is not JSON and comes back as `Raw("")`.
    pub fn decode(text: String) -> Self {
        match serde_json::from_str(&text) {
            Ok(value) => ResponseBody::Json(value),
            Err(_) => ResponseBody::Raw(text),
        }
    }

    /// Convert into a JSON value; raw text becomes `{"raw": text}`
    pub fn into_value(self) -> Value {
        match self {
            ResponseBody::Json(value) => value,
            ResponseBody::Raw(text) => json!({ "raw": text }),
        }
    }
}

/// A single call against the backend
///
/// `path` is appended to the configured base URL and must already carry any
/// query string. Returns the decoded body on a 2xx status.
#[async_trait]
pub trait Backend: Send + Sync {
    async fn request(
        &self,
        path: &str,
        method: HttpMethod,
        body: Option<Value>,
    ) -> Result<Value, BackendError>;
}
