/// Tools that read content-type and component definitions from the project
///
/// Strapi keeps one `schema.json` per content type under
/// `src/api/<api>/content-types/<name>/` and one JSON file per component
/// under `src/components/<category>/`. Missing directories are reported in
/// the result instead of failing the call.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::path::Path;
use tracing::warn;

use super::{validate_segment, ToolContext, ToolError};

/// Parameters for listing content types (none)
#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct ListContentTypesParams {}

/// Parameters for fetching one content-type schema
#[derive(Debug, Deserialize, JsonSchema)]
pub struct GetContentTypeSchemaParams {
    /// Content type UID (e.g. "api::article.article") or plain name (e.g. "article")
    pub content_type: String,
}

/// Parameters for listing components
#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct ListComponentsParams {
    /// Only list components in this category (optional)
    pub category: Option<String>,
}

/// Summary of one content type
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentTypeSummary {
    pub uid: String,
    pub kind: Option<String>,
    pub display_name: Option<String>,
    pub singular_name: Option<String>,
    pub plural_name: Option<String>,
    pub attribute_count: usize,
}

/// Summary of one component
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentSummary {
    pub uid: String,
    pub category: String,
    pub display_name: Option<String>,
    pub attribute_count: usize,
}

/// List every content type defined under `src/api`
pub async fn list_content_types(
    ctx: &ToolContext,
    _params: ListContentTypesParams,
) -> Result<Value, ToolError> {
    let api_dir = ctx.config.project_root().join("src").join("api");
    if !is_dir(&api_dir).await {
        return Ok(json!({
            "contentTypes": [],
            "count": 0,
            "message": format!("No API directory found at {}", api_dir.display()),
        }));
    }

    let mut summaries = Vec::new();
    for api in sorted_entries(&api_dir, EntryKind::Dir).await? {
        let types_dir = api_dir.join(&api).join("content-types");
        if !is_dir(&types_dir).await {
            continue;
        }

        for name in sorted_entries(&types_dir, EntryKind::Dir).await? {
            let schema_path = types_dir.join(&name).join("schema.json");
            match read_json(&schema_path).await {
                Ok(Some(schema)) => summaries.push(ContentTypeSummary {
                    uid: format!("api::{}.{}", api, name),
                    kind: string_field(&schema, "kind"),
                    display_name: info_field(&schema, "displayName"),
                    singular_name: info_field(&schema, "singularName"),
                    plural_name: info_field(&schema, "pluralName"),
                    attribute_count: attribute_count(&schema),
                }),
                Ok(None) => {}
                Err(e) => warn!("Skipping content type {}.{}: {}", api, name, e),
            }
        }
    }

    Ok(json!({
        "count": summaries.len(),
        "contentTypes": summaries,
    }))
}

/// Read the full schema of one content type
pub async fn get_content_type_schema(
    ctx: &ToolContext,
    params: GetContentTypeSchemaParams,
) -> Result<Value, ToolError> {
    let uid = params.content_type.trim();

    let (api, name) = match uid.split_once("::") {
        Some(("api", rest)) => match rest.split_once('.') {
            Some((api, name)) => (api, name),
            None => (rest, rest),
        },
        Some((namespace, _)) => {
            return Ok(json!({
                "found": false,
                "uid": uid,
                "message": format!(
                    "Content types in the '{}' namespace are not stored in the project source",
                    namespace
                ),
            }));
        }
        None => (uid, uid),
    };

    let api = validate_segment("content_type", api)?;
    let name = validate_segment("content_type", name)?;

    let schema_path = ctx
        .config
        .project_root()
        .join("src")
        .join("api")
        .join(api)
        .join("content-types")
        .join(name)
        .join("schema.json");

    match read_json(&schema_path).await? {
        Some(schema) => Ok(json!({
            "found": true,
            "uid": format!("api::{}.{}", api, name),
            "schema": schema,
        })),
        None => Ok(json!({
            "found": false,
            "uid": format!("api::{}.{}", api, name),
            "message": format!("No schema found at {}", schema_path.display()),
        })),
    }
}

/// List shared components under `src/components`
pub async fn list_components(
    ctx: &ToolContext,
    params: ListComponentsParams,
) -> Result<Value, ToolError> {
    let components_dir = ctx.config.project_root().join("src").join("components");
    if !is_dir(&components_dir).await {
        return Ok(json!({
            "components": [],
            "count": 0,
            "message": format!("No components directory found at {}", components_dir.display()),
        }));
    }

    let categories = match &params.category {
        Some(category) => {
            let category = validate_segment("category", category)?;
            if !is_dir(&components_dir.join(category)).await {
                return Ok(json!({
                    "components": [],
                    "count": 0,
                    "message": format!("No component category named '{}'", category),
                }));
            }
            vec![category.to_string()]
        }
        None => sorted_entries(&components_dir, EntryKind::Dir).await?,
    };

    let mut summaries = Vec::new();
    for category in categories {
        let category_dir = components_dir.join(&category);
        for file in sorted_entries(&category_dir, EntryKind::File).await? {
            let Some(name) = file.strip_suffix(".json") else {
                continue;
            };
            match read_json(&category_dir.join(&file)).await {
                Ok(Some(definition)) => summaries.push(ComponentSummary {
                    uid: format!("{}.{}", category, name),
                    category: category.clone(),
                    display_name: info_field(&definition, "displayName"),
                    attribute_count: attribute_count(&definition),
                }),
                Ok(None) => {}
                Err(e) => warn!("Skipping component {}.{}: {}", category, name, e),
            }
        }
    }

    Ok(json!({
        "count": summaries.len(),
        "components": summaries,
    }))
}

#[derive(Clone, Copy, PartialEq)]
enum EntryKind {
    Dir,
    File,
}

async fn is_dir(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|m| m.is_dir())
        .unwrap_or(false)
}

/// Names of the directory's children of the given kind, sorted
async fn sorted_entries(dir: &Path, kind: EntryKind) -> Result<Vec<String>, ToolError> {
    let mut names = Vec::new();
    let mut entries = tokio::fs::read_dir(dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        let file_type = entry.file_type().await?;
        let matches = match kind {
            EntryKind::Dir => file_type.is_dir(),
            EntryKind::File => file_type.is_file(),
        };
        if matches {
            if let Some(name) = entry.file_name().to_str() {
                names.push(name.to_string());
            }
        }
    }
    names.sort();
    Ok(names)
}

/// Read and parse a JSON file; `Ok(None)` when it does not exist
async fn read_json(path: &Path) -> Result<Option<Value>, ToolError> {
    let text = match tokio::fs::read_to_string(path).await {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    serde_json::from_str(&text)
        .map(Some)
        .map_err(|e| ToolError::MalformedFile {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
}

fn string_field(doc: &Value, key: &str) -> Option<String> {
    doc.get(key).and_then(Value::as_str).map(str::to_string)
}

fn info_field(doc: &Value, key: &str) -> Option<String> {
    doc.get("info").and_then(|info| string_field(info, key))
}

fn attribute_count(doc: &Value) -> usize {
    doc.get("attributes")
        .and_then(Value::as_object)
        .map(|attrs| attrs.len())
        .unwrap_or(0)
}
