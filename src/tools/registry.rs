/// The fixed set of tools this server exposes
///
/// Every tool is a `ToolKind` variant. The registry turns them into MCP tool
/// definitions once at startup and maps incoming names back to a variant;
/// `ToolKind::execute` runs the matching implementation.

use schemars::gen::SchemaSettings;
use schemars::JsonSchema;
use serde_json::{json, Value};
use std::collections::HashMap;

use super::content_types::{self, GetContentTypeSchemaParams, ListComponentsParams, ListContentTypesParams};
use super::entries::{
    self, CreateEntryParams, DeleteEntryParams, GetEntryParams, GetSingleTypeParams, QueryEntriesParams,
    UpdateEntryParams,
};
use super::media::{self, BulkReplaceParams, ListMediaParams};
use super::plugins::{self, PluginStructureParams};
use super::{parse_args, ToolContext, ToolError};
use crate::mcp::protocol::ToolDefinition;

/// Identifies one tool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolKind {
    ListContentTypes,
    GetContentTypeSchema,
    ListComponents,
    GetPluginStructure,
    QueryEntries,
    GetEntry,
    CreateEntry,
    UpdateEntry,
    DeleteEntry,
    ListMedia,
    GetSingleType,
    BulkReplaceMediaUrls,
}

impl ToolKind {
    /// All tools, in the order they are listed to clients
    pub const ALL: [ToolKind; 12] = [
        ToolKind::ListContentTypes,
        ToolKind::GetContentTypeSchema,
        ToolKind::ListComponents,
        ToolKind::GetPluginStructure,
        ToolKind::QueryEntries,
        ToolKind::GetEntry,
        ToolKind::CreateEntry,
        ToolKind::UpdateEntry,
        ToolKind::DeleteEntry,
        ToolKind::ListMedia,
        ToolKind::GetSingleType,
        ToolKind::BulkReplaceMediaUrls,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ToolKind::ListContentTypes => "list_content_types",
            ToolKind::GetContentTypeSchema => "get_content_type_schema",
            ToolKind::ListComponents => "list_components",
            ToolKind::GetPluginStructure => "get_plugin_structure",
            ToolKind::QueryEntries => "query_entries",
            ToolKind::GetEntry => "get_entry",
            ToolKind::CreateEntry => "create_entry",
            ToolKind::UpdateEntry => "update_entry",
            ToolKind::DeleteEntry => "delete_entry",
            ToolKind::ListMedia => "list_media",
            ToolKind::GetSingleType => "get_single_type",
            ToolKind::BulkReplaceMediaUrls => "bulk_replace_media_urls",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ToolKind::ListContentTypes => "List all content types defined in the local Strapi project",
            ToolKind::GetContentTypeSchema => "Get the full schema (attributes, relations, options) of a content type from the local project",
            ToolKind::ListComponents => "List shared components defined in the local project, optionally for one category",
            ToolKind::GetPluginStructure => "Show the directory structure of local plugins under src/plugins",
            ToolKind::QueryEntries => "Query entries of a collection type with filters, sorting, population and pagination",
            ToolKind::GetEntry => "Get a single entry of a collection type by its document ID",
            ToolKind::CreateEntry => "Create a new entry in a collection type",
            ToolKind::UpdateEntry => "Update fields of an existing entry",
            ToolKind::DeleteEntry => "Delete an entry from a collection type",
            ToolKind::ListMedia => "List files in the media library with pagination",
            ToolKind::GetSingleType => "Get the content of a single type",
            ToolKind::BulkReplaceMediaUrls => "Replace a URL prefix in every media library file (e.g. after moving to a new CDN). Reports per-file failures and returns partial results if a page cannot be fetched",
        }
    }

    fn input_schema(&self) -> Value {
        match self {
            ToolKind::ListContentTypes => input_schema::<ListContentTypesParams>(),
            ToolKind::GetContentTypeSchema => input_schema::<GetContentTypeSchemaParams>(),
            ToolKind::ListComponents => input_schema::<ListComponentsParams>(),
            ToolKind::GetPluginStructure => input_schema::<PluginStructureParams>(),
            ToolKind::QueryEntries => input_schema::<QueryEntriesParams>(),
            ToolKind::GetEntry => input_schema::<GetEntryParams>(),
            ToolKind::CreateEntry => input_schema::<CreateEntryParams>(),
            ToolKind::UpdateEntry => input_schema::<UpdateEntryParams>(),
            ToolKind::DeleteEntry => input_schema::<DeleteEntryParams>(),
            ToolKind::ListMedia => input_schema::<ListMediaParams>(),
            ToolKind::GetSingleType => input_schema::<GetSingleTypeParams>(),
            ToolKind::BulkReplaceMediaUrls => input_schema::<BulkReplaceParams>(),
        }
    }

    /// Decode the arguments and run the tool
    pub async fn execute(&self, ctx: &ToolContext, args: Value) -> Result<Value, ToolError> {
        match self {
            ToolKind::ListContentTypes => content_types::list_content_types(ctx, parse_args(args)?).await,
            ToolKind::GetContentTypeSchema => content_types::get_content_type_schema(ctx, parse_args(args)?).await,
            ToolKind::ListComponents => content_types::list_components(ctx, parse_args(args)?).await,
            ToolKind::GetPluginStructure => plugins::get_plugin_structure(ctx, parse_args(args)?).await,
            ToolKind::QueryEntries => entries::query_entries(ctx, parse_args(args)?).await,
            ToolKind::GetEntry => entries::get_entry(ctx, parse_args(args)?).await,
            ToolKind::CreateEntry => entries::create_entry(ctx, parse_args(args)?).await,
            ToolKind::UpdateEntry => entries::update_entry(ctx, parse_args(args)?).await,
            ToolKind::DeleteEntry => entries::delete_entry(ctx, parse_args(args)?).await,
            ToolKind::ListMedia => media::list_media(ctx, parse_args(args)?).await,
            ToolKind::GetSingleType => entries::get_single_type(ctx, parse_args(args)?).await,
            ToolKind::BulkReplaceMediaUrls => media::bulk_replace_media_urls(ctx, parse_args(args)?).await,
        }
    }
}

/// JSON schema for a parameter struct, with subschemas inlined
fn input_schema<T: JsonSchema>() -> Value {
    let settings = SchemaSettings::draft07().with(|s| {
        s.inline_subschemas = true;
        s.meta_schema = None;
    });
    let schema = settings.into_generator().into_root_schema_for::<T>();
    serde_json::to_value(schema).unwrap_or_else(|_| json!({ "type": "object" }))
}

/// Tool definitions and name lookup, built once
pub struct ToolRegistry {
    definitions: Vec<ToolDefinition>,
    by_name: HashMap<&'static str, ToolKind>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        let mut by_name = HashMap::new();
        let definitions = ToolKind::ALL
            .iter()
            .map(|kind| {
                let previous = by_name.insert(kind.name(), *kind);
                debug_assert!(previous.is_none(), "duplicate tool name {}", kind.name());
                ToolDefinition {
                    name: kind.name().to_string(),
                    description: kind.description().to_string(),
                    input_schema: kind.input_schema(),
                }
            })
            .collect();

        Self { definitions, by_name }
    }

    /// Definitions in listing order
    pub fn definitions(&self) -> &[ToolDefinition] {
        &self.definitions
    }

    pub fn lookup(&self, name: &str) -> Option<ToolKind> {
        self.by_name.get(name).copied()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}
