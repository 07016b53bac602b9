/// MCP tools for working with a Strapi project
///
/// This module contains all the tools that external clients (like Claude)
/// can call. Local tools read the project checkout, remote tools go through
/// the `Backend`.

pub mod content_types;
pub mod entries;
pub mod media;
pub mod plugins;
pub mod registry;

pub use registry::{ToolKind, ToolRegistry};

use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

use crate::backend::{Backend, BackendError};
use crate::config::Config;
use crate::query::QueryValue;

/// Errors a tool can fail with
///
/// These never become JSON-RPC errors; the dispatcher reports them as
/// error-flagged tool results.
#[derive(Error, Debug)]
pub enum ToolError {
    #[error("Invalid arguments: {0}")]
    InvalidArguments(serde_json::Error),

    #[error("Invalid argument '{name}': {reason}")]
    InvalidArgument { name: &'static str, reason: String },

    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed JSON in {path}: {reason}")]
    MalformedFile { path: String, reason: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Background task failed: {0}")]
    Task(String),
}

/// Everything a tool needs to run
#[derive(Clone)]
pub struct ToolContext {
    pub config: Arc<Config>,
    pub backend: Arc<dyn Backend>,
}

impl ToolContext {
    pub fn new(config: Arc<Config>, backend: Arc<dyn Backend>) -> Self {
        Self { config, backend }
    }
}

/// Decode tool arguments into their typed form
///
/// A missing `arguments` object is treated as `{}` so tools without
/// required fields can be called bare.
pub(crate) fn parse_args<T: DeserializeOwned>(args: Value) -> Result<T, ToolError> {
    let args = if args.is_null() { Value::Object(Default::default()) } else { args };
    serde_json::from_value(args).map_err(ToolError::InvalidArguments)
}

/// Check that a value is safe to use as a single path segment
///
/// Only ASCII letters, digits, `_`, `-` and `.` are allowed, and `.`/`..`
/// are rejected, so arguments can neither escape the project root nor
/// rewrite a REST path.
pub(crate) fn validate_segment<'a>(name: &'static str, value: &'a str) -> Result<&'a str, ToolError> {
    let valid = !value.is_empty()
        && value != "."
        && value != ".."
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));

    if valid {
        Ok(value)
    } else {
        Err(ToolError::InvalidArgument {
            name,
            reason: format!("'{}' is not a valid identifier", value),
        })
    }
}

/// Turn an optional `query` argument into a query tree
pub(crate) fn parse_query(query: Option<Value>) -> Result<QueryValue, ToolError> {
    match query {
        None | Some(Value::Null) => Ok(QueryValue::empty()),
        Some(value @ Value::Object(_)) => Ok(QueryValue::from(&value)),
        Some(_) => Err(ToolError::InvalidArgument {
            name: "query",
            reason: "must be an object".to_string(),
        }),
    }
}
