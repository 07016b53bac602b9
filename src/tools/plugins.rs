/// Tool for inspecting local plugin source trees
///
/// Walks `src/plugins` (or a single plugin inside it) and returns a nested
/// directory tree. The walk runs on the blocking pool.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::path::Path;

use super::{validate_segment, ToolContext, ToolError};

/// Default number of directory levels returned
pub const DEFAULT_MAX_DEPTH: usize = 4;

/// Directories that are never descended into
const SKIPPED_DIRS: &[&str] = &["node_modules", ".git", "dist", "build", ".cache"];

/// Parameters for walking plugin sources
#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct PluginStructureParams {
    /// Plugin directory name under src/plugins (optional - walks all plugins if omitted)
    pub plugin: Option<String>,
    /// How many directory levels to descend (optional, defaults to 4)
    pub max_depth: Option<usize>,
}

/// One node of the returned tree
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TreeNode {
    Directory {
        name: String,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        children: Vec<TreeNode>,
        /// Set when children were not listed because of the depth limit
        #[serde(skip_serializing_if = "std::ops::Not::not")]
        truncated: bool,
    },
    File {
        name: String,
        size: u64,
    },
}

/// Describe the directory layout of one or all local plugins
pub async fn get_plugin_structure(
    ctx: &ToolContext,
    params: PluginStructureParams,
) -> Result<Value, ToolError> {
    let mut root = ctx.config.project_root().join("src").join("plugins");
    if let Some(plugin) = &params.plugin {
        root.push(validate_segment("plugin", plugin)?);
    }
    let max_depth = params.max_depth.unwrap_or(DEFAULT_MAX_DEPTH);

    let walk_root = root.clone();
    let tree = tokio::task::spawn_blocking(move || {
        if walk_root.is_dir() {
            walk(&walk_root, max_depth).map(Some)
        } else {
            Ok(None)
        }
    })
    .await
    .map_err(|e| ToolError::Task(e.to_string()))??;

    match tree {
        Some(tree) => Ok(json!({
            "found": true,
            "path": root.display().to_string(),
            "tree": tree,
        })),
        None => Ok(json!({
            "found": false,
            "path": root.display().to_string(),
            "message": format!("No plugin directory found at {}", root.display()),
        })),
    }
}

fn walk(dir: &Path, depth: usize) -> Result<TreeNode, std::io::Error> {
    let name = dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    if depth == 0 {
        return Ok(TreeNode::Directory { name, children: Vec::new(), truncated: true });
    }

    let mut entries = std::fs::read_dir(dir)?.collect::<Result<Vec<_>, _>>()?;
    entries.sort_by_key(|e| e.file_name());

    let mut children = Vec::new();
    for entry in entries {
        let file_type = entry.file_type()?;
        let entry_name = entry.file_name().to_string_lossy().into_owned();

        if file_type.is_dir() {
            if SKIPPED_DIRS.contains(&entry_name.as_str()) {
                continue;
            }
            children.push(walk(&entry.path(), depth - 1)?);
        } else if file_type.is_file() {
            children.push(TreeNode::File {
                name: entry_name,
                size: entry.metadata()?.len(),
            });
        }
    }

    Ok(TreeNode::Directory { name, children, truncated: false })
}
