/// Process configuration
///
/// The backend URL, API token and project root are resolved once at startup
/// and shared read-only with the backend client and the local tools.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while building the configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid backend URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
}

/// Immutable server configuration
#[derive(Debug, Clone)]
pub struct Config {
    base_url: String,
    api_token: Option<String>,
    project_root: PathBuf,
}

impl Config {
    /// Validate and freeze the configuration
    ///
    /// Trailing slashes are stripped from the base URL so request paths can be
    /// appended verbatim. A blank token counts as no token.
    pub fn new(
        base_url: &str,
        api_token: Option<String>,
        project_root: impl Into<PathBuf>,
    ) -> Result<Self, ConfigError> {
        let parsed = url::Url::parse(base_url).map_err(|e| ConfigError::InvalidUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;

        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidUrl {
                url: base_url.to_string(),
                reason: format!("unsupported scheme '{}'", parsed.scheme()),
            });
        }

        let api_token = api_token
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_token,
            project_root: project_root.into(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn api_token(&self) -> Option<&str> {
        self.api_token.as_deref()
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }
}
