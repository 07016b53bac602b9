/// Tools for reading and writing content entries through the REST API
///
/// Each tool is a single backend call and fails as a whole if that call fails.

use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{json, Value};

use super::{parse_query, validate_segment, ToolContext, ToolError};
use crate::backend::HttpMethod;
use crate::query::with_query;

/// Parameters for querying a collection
#[derive(Debug, Deserialize, JsonSchema)]
pub struct QueryEntriesParams {
    /// Plural API ID of the collection type (e.g. "articles")
    pub plural_api_id: String,
    /// Filters, sort, populate, pagination and fields as a nested object (optional)
    pub query: Option<Value>,
}

/// Parameters for fetching a single entry
#[derive(Debug, Deserialize, JsonSchema)]
pub struct GetEntryParams {
    /// Plural API ID of the collection type (e.g. "articles")
    pub plural_api_id: String,
    /// Document ID (or numeric ID) of the entry
    pub document_id: String,
    /// Populate/fields options as a nested object (optional)
    pub query: Option<Value>,
}

/// Parameters for creating an entry
#[derive(Debug, Deserialize, JsonSchema)]
pub struct CreateEntryParams {
    /// Plural API ID of the collection type (e.g. "articles")
    pub plural_api_id: String,
    /// Field values of the new entry
    pub data: Value,
}

/// Parameters for updating an entry
#[derive(Debug, Deserialize, JsonSchema)]
pub struct UpdateEntryParams {
    /// Plural API ID of the collection type (e.g. "articles")
    pub plural_api_id: String,
    /// Document ID (or numeric ID) of the entry
    pub document_id: String,
    /// Fields to change
    pub data: Value,
}

/// Parameters for deleting an entry
#[derive(Debug, Deserialize, JsonSchema)]
pub struct DeleteEntryParams {
    /// Plural API ID of the collection type (e.g. "articles")
    pub plural_api_id: String,
    /// Document ID (or numeric ID) of the entry
    pub document_id: String,
}

/// Parameters for reading a single type
#[derive(Debug, Deserialize, JsonSchema)]
pub struct GetSingleTypeParams {
    /// Singular API ID of the single type (e.g. "homepage")
    pub singular_api_id: String,
    /// Populate/fields options as a nested object (optional)
    pub query: Option<Value>,
}

pub async fn query_entries(ctx: &ToolContext, params: QueryEntriesParams) -> Result<Value, ToolError> {
    let collection = validate_segment("plural_api_id", &params.plural_api_id)?;
    let query = parse_query(params.query)?;
    let path = with_query(&format!("/api/{}", collection), &query);
    Ok(ctx.backend.request(&path, HttpMethod::Get, None).await?)
}

pub async fn get_entry(ctx: &ToolContext, params: GetEntryParams) -> Result<Value, ToolError> {
    let collection = validate_segment("plural_api_id", &params.plural_api_id)?;
    let id = validate_segment("document_id", &params.document_id)?;
    let query = parse_query(params.query)?;
    let path = with_query(&format!("/api/{}/{}", collection, id), &query);
    Ok(ctx.backend.request(&path, HttpMethod::Get, None).await?)
}

pub async fn create_entry(ctx: &ToolContext, params: CreateEntryParams) -> Result<Value, ToolError> {
    let collection = validate_segment("plural_api_id", &params.plural_api_id)?;
    require_object("data", &params.data)?;
    let path = format!("/api/{}", collection);
    let body = json!({ "data": params.data });
    Ok(ctx.backend.request(&path, HttpMethod::Post, Some(body)).await?)
}

pub async fn update_entry(ctx: &ToolContext, params: UpdateEntryParams) -> Result<Value, ToolError> {
    let collection = validate_segment("plural_api_id", &params.plural_api_id)?;
    let id = validate_segment("document_id", &params.document_id)?;
    require_object("data", &params.data)?;
    let path = format!("/api/{}/{}", collection, id);
    let body = json!({ "data": params.data });
    Ok(ctx.backend.request(&path, HttpMethod::Put, Some(body)).await?)
}

/// Delete an entry
///
/// Strapi answers a successful delete with an empty body, so the result
/// echoes what was removed.
pub async fn delete_entry(ctx: &ToolContext, params: DeleteEntryParams) -> Result<Value, ToolError> {
    let collection = validate_segment("plural_api_id", &params.plural_api_id)?;
    let id = validate_segment("document_id", &params.document_id)?;
    let path = format!("/api/{}/{}", collection, id);
    let response = ctx.backend.request(&path, HttpMethod::Delete, None).await?;

    if is_empty_body(&response) {
        Ok(json!({ "deleted": true, "pluralApiId": collection, "documentId": id }))
    } else {
        Ok(response)
    }
}

/// `null` or the raw wrapper around blank text
fn is_empty_body(response: &Value) -> bool {
    match response {
        Value::Null => true,
        Value::Object(map) if map.len() == 1 => map
            .get("raw")
            .and_then(Value::as_str)
            .map_or(false, |text| text.trim().is_empty()),
        _ => false,
    }
}

pub async fn get_single_type(ctx: &ToolContext, params: GetSingleTypeParams) -> Result<Value, ToolError> {
    let single = validate_segment("singular_api_id", &params.singular_api_id)?;
    let query = parse_query(params.query)?;
    let path = with_query(&format!("/api/{}", single), &query);
    Ok(ctx.backend.request(&path, HttpMethod::Get, None).await?)
}

fn require_object(name: &'static str, value: &Value) -> Result<(), ToolError> {
    if value.is_object() {
        Ok(())
    } else {
        Err(ToolError::InvalidArgument {
            name,
            reason: "must be an object".to_string(),
        })
    }
}
