/// Tools for the media library
///
/// `bulk_replace_media_urls` is the only multi-step tool: it pages through
/// every uploaded file and rewrites URLs that contain an old prefix. Unlike
/// the other tools it never fails as a whole; per-file failures are collected
/// and a failed page fetch ends the scan with whatever was done so far.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use super::{parse_query, validate_segment, ToolContext, ToolError};
use crate::backend::HttpMethod;
use crate::query::{with_query, QueryValue};

/// Page size used when scanning the media library
pub const MEDIA_PAGE_SIZE: u32 = 100;

/// Upper bound on pages scanned in one bulk replace
pub const MAX_MEDIA_PAGES: u32 = 1000;

const DEFAULT_LIST_PAGE_SIZE: u32 = 25;

const FILES_PATH: &str = "/api/upload/files";

/// Parameters for listing media files
#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct ListMediaParams {
    /// Page number, starting at 1 (optional, defaults to 1)
    pub page: Option<u32>,
    /// Files per page (optional, defaults to 25)
    pub page_size: Option<u32>,
    /// Extra filters/sort as a nested object (optional)
    pub query: Option<Value>,
}

/// Parameters for rewriting media URLs
#[derive(Debug, Deserialize, JsonSchema)]
pub struct BulkReplaceParams {
    /// Text to look for in each file URL (e.g. "https://old-cdn.example.com")
    pub old_prefix: String,
    /// Replacement for the first occurrence of old_prefix
    pub new_prefix: String,
    /// Only count matching files without updating them (optional, defaults to false)
    #[serde(default)]
    pub dry_run: bool,
}

/// A file that could not be updated
#[derive(Debug, Serialize)]
pub struct ReplaceFailure {
    pub id: Value,
    pub url: String,
    pub error: String,
}

/// Outcome of a bulk replace, possibly partial
#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkReplaceReport {
    pub total_scanned: usize,
    pub total_matched: usize,
    pub total_updated: usize,
    pub failures: Vec<ReplaceFailure>,
    pub pages_fetched: u32,
    pub dry_run: bool,
    /// Set when a page could not be fetched and the scan stopped early
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_error: Option<String>,
}

pub async fn list_media(ctx: &ToolContext, params: ListMediaParams) -> Result<Value, ToolError> {
    let mut query = parse_query(params.query)?;
    query.insert(
        "pagination",
        page_query(
            params.page.unwrap_or(1).max(1),
            params.page_size.unwrap_or(DEFAULT_LIST_PAGE_SIZE).max(1),
        ),
    );

    let path = with_query(FILES_PATH, &query);
    Ok(ctx.backend.request(&path, HttpMethod::Get, None).await?)
}

/// Rewrite every media URL containing `old_prefix`
pub async fn bulk_replace_media_urls(
    ctx: &ToolContext,
    params: BulkReplaceParams,
) -> Result<Value, ToolError> {
    if params.old_prefix.is_empty() {
        return Err(ToolError::InvalidArgument {
            name: "old_prefix",
            reason: "must not be empty".to_string(),
        });
    }

    let report = replace_media_urls(ctx, &params).await;
    info!(
        "Bulk media replace finished: {} scanned, {} matched, {} updated, {} failed",
        report.total_scanned,
        report.total_matched,
        report.total_updated,
        report.failures.len()
    );
    Ok(serde_json::to_value(report)?)
}

async fn replace_media_urls(ctx: &ToolContext, params: &BulkReplaceParams) -> BulkReplaceReport {
    let mut report = BulkReplaceReport {
        dry_run: params.dry_run,
        ..Default::default()
    };

    for page in 1..=MAX_MEDIA_PAGES {
        let mut query = QueryValue::empty();
        query.insert("pagination", page_query(page, MEDIA_PAGE_SIZE));
        let path = with_query(FILES_PATH, &query);

        let assets = match ctx.backend.request(&path, HttpMethod::Get, None).await {
            Ok(body) => page_items(body),
            Err(e) => {
                warn!("Stopping media scan, page {} failed: {}", page, e);
                report.page_error = Some(format!("Page {}: {}", page, e));
                return report;
            }
        };
        report.pages_fetched = page;
        report.total_scanned += assets.len();
        debug!("Media page {} returned {} files", page, assets.len());

        for asset in &assets {
            let Some(update) = rewrite_asset(asset, &params.old_prefix, &params.new_prefix) else {
                continue;
            };
            report.total_matched += 1;
            if params.dry_run {
                continue;
            }

            let id = asset.get("id").cloned().unwrap_or(Value::Null);
            let url = asset.get("url").and_then(Value::as_str).unwrap_or_default().to_string();
            let update_path = match id_segment(&id) {
                Ok(segment) => format!("{}/{}", FILES_PATH, segment),
                Err(e) => {
                    warn!("Skipping media file with unusable id {}: {}", id, e);
                    report.failures.push(ReplaceFailure {
                        id,
                        url,
                        error: e.to_string(),
                    });
                    continue;
                }
            };

            match ctx.backend.request(&update_path, HttpMethod::Put, Some(update)).await {
                Ok(_) => report.total_updated += 1,
                Err(e) => report.failures.push(ReplaceFailure {
                    id,
                    url,
                    error: e.to_string(),
                }),
            }
        }

        if assets.len() < MEDIA_PAGE_SIZE as usize {
            return report;
        }
    }

    warn!("Media scan hit the {} page limit", MAX_MEDIA_PAGES);
    report
}

fn page_query(page: u32, page_size: u32) -> QueryValue {
    let mut pagination = QueryValue::empty();
    pagination.insert("page", QueryValue::from(page));
    pagination.insert("pageSize", QueryValue::from(page_size));
    pagination
}

/// List endpoints return either a bare array or `{ "data": [...] }`
fn page_items(body: Value) -> Vec<Value> {
    match body {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("data") {
            Some(Value::Array(items)) => items,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    }
}

/// Build the update body for an asset, or `None` if its URL does not match
fn rewrite_asset(asset: &Value, old_prefix: &str, new_prefix: &str) -> Option<Value> {
    let url = asset.get("url").and_then(Value::as_str)?;
    if !url.contains(old_prefix) {
        return None;
    }

    let mut update = json!({ "url": url.replacen(old_prefix, new_prefix, 1) });

    if let Some(formats) = asset.get("formats").and_then(Value::as_object) {
        let mut rewritten = formats.clone();
        for format in rewritten.values_mut() {
            if let Some(format_url) = format.get("url").and_then(Value::as_str) {
                let replaced = format_url.replacen(old_prefix, new_prefix, 1);
                format["url"] = Value::String(replaced);
            }
        }
        update["formats"] = Value::Object(rewritten);
    }

    Some(update)
}

/// Path segment for a file id; ids are numbers or plain identifiers
fn id_segment(id: &Value) -> Result<String, ToolError> {
    match id {
        Value::Number(n) => Ok(n.to_string()),
        Value::String(s) => validate_segment("id", s).map(str::to_string),
        Value::Null => Err(ToolError::InvalidArgument {
            name: "id",
            reason: "media file has no id".to_string(),
        }),
        other => Err(ToolError::InvalidArgument {
            name: "id",
            reason: format!("{} is not a usable file id", other),
        }),
    }
}
