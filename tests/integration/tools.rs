/// Tool executors driven through the registry against a fake backend
use super::support::*;
use serde_json::{json, Value};
use std::path::Path;
use std::sync::Arc;
use strapi_mcp::*;
use tempfile::tempdir;
use tokio_test::{assert_err, assert_ok};

async fn call(ctx: &ToolContext, tool: ToolKind, args: Value) -> Result<Value, ToolError> {
    tool.execute(ctx, args).await
}

fn echo_context(root: &Path) -> (ToolContext, Arc<FakeBackend>) {
    let backend = Arc::new(FakeBackend::echo());
    (context(root, backend.clone()), backend)
}

#[tokio::test]
async fn test_query_entries_encodes_nested_query() {
    let root = tempdir().unwrap();
    let (ctx, backend) = echo_context(root.path());

    let result = assert_ok!(
        call(
            &ctx,
            ToolKind::QueryEntries,
            json!({
                "plural_api_id": "articles",
                "query": {
                    "filters": {"title": {"$containsi": "rust"}},
                    "populate": ["author", "cover"],
                    "sort": "publishedAt:desc"
                }
            }),
        )
        .await
    );

    assert_eq!(
        result["path"],
        "/api/articles?filters[title][$containsi]=rust&populate[0]=author&populate[1]=cover&sort=publishedAt%3Adesc"
    );
    assert_eq!(backend.calls()[0].method, HttpMethod::Get);
}

#[tokio::test]
async fn test_query_without_filters_has_no_question_mark() {
    let root = tempdir().unwrap();
    let (ctx, _) = echo_context(root.path());

    let result = assert_ok!(call(&ctx, ToolKind::QueryEntries, json!({"plural_api_id": "articles", "query": {}})).await);
    assert_eq!(result["path"], "/api/articles");

    let result = assert_ok!(call(&ctx, ToolKind::GetSingleType, json!({"singular_api_id": "homepage"})).await);
    assert_eq!(result["path"], "/api/homepage");
}

#[tokio::test]
async fn test_entry_crud_paths_and_bodies() {
    let root = tempdir().unwrap();
    let backend = Arc::new(FakeBackend::new(|path, method, body| {
        if method == HttpMethod::Delete {
            return Ok(Value::Null);
        }
        Ok(json!({ "path": path, "body": body }))
    }));
    let ctx = context(root.path(), backend.clone());

    let get = assert_ok!(call(&ctx, ToolKind::GetEntry, json!({
        "plural_api_id": "articles",
        "document_id": "abc123",
        "query": {"populate": "*"}
    })).await);
    assert_eq!(get["path"], "/api/articles/abc123?populate=*");

    let created = assert_ok!(call(&ctx, ToolKind::CreateEntry, json!({
        "plural_api_id": "articles",
        "data": {"title": "Hello"}
    })).await);
    assert_eq!(created["path"], "/api/articles");
    assert_eq!(created["body"], json!({"data": {"title": "Hello"}}));

    let updated = assert_ok!(call(&ctx, ToolKind::UpdateEntry, json!({
        "plural_api_id": "articles",
        "document_id": "abc123",
        "data": {"title": "Changed"}
    })).await);
    assert_eq!(updated["path"], "/api/articles/abc123");
    assert_eq!(updated["body"]["data"]["title"], "Changed");

    let deleted = assert_ok!(call(&ctx, ToolKind::DeleteEntry, json!({
        "plural_api_id": "articles",
        "document_id": "abc123"
    })).await);
    assert_eq!(deleted["deleted"], true);
    assert_eq!(deleted["documentId"], "abc123");

    let methods: Vec<HttpMethod> = backend.calls().iter().map(|c| c.method).collect();
    assert_eq!(
        methods,
        vec![HttpMethod::Get, HttpMethod::Post, HttpMethod::Put, HttpMethod::Delete]
    );
}

#[tokio::test]
async fn test_delete_with_empty_raw_body_reports_deletion() {
    let root = tempdir().unwrap();
    let backend = Arc::new(FakeBackend::new(|_, _, _| Ok(json!({"raw": ""}))));
    let ctx = context(root.path(), backend);

    let deleted = assert_ok!(call(&ctx, ToolKind::DeleteEntry, json!({
        "plural_api_id": "articles",
        "document_id": "abc123"
    })).await);
    assert_eq!(deleted, json!({"deleted": true, "pluralApiId": "articles", "documentId": "abc123"}));
}

#[tokio::test]
async fn test_invalid_arguments_never_reach_the_backend() {
    let root = tempdir().unwrap();
    let (ctx, backend) = echo_context(root.path());

    assert_err!(call(&ctx, ToolKind::GetEntry, json!({"plural_api_id": "articles"})).await);
    assert_err!(call(&ctx, ToolKind::GetEntry, json!({"plural_api_id": "../admin", "document_id": "1"})).await);
    assert_err!(call(&ctx, ToolKind::CreateEntry, json!({"plural_api_id": "articles", "data": "title=x"})).await);
    assert_err!(call(&ctx, ToolKind::QueryEntries, json!({"plural_api_id": "articles", "query": [1, 2]})).await);

    assert!(backend.calls().is_empty());
}

#[tokio::test]
async fn test_list_media_pagination() {
    let root = tempdir().unwrap();
    let (ctx, _) = echo_context(root.path());

    let result = assert_ok!(call(&ctx, ToolKind::ListMedia, json!({"page": 2, "page_size": 10})).await);
    assert_eq!(result["path"], "/api/upload/files?pagination[page]=2&pagination[pageSize]=10");

    let result = assert_ok!(call(&ctx, ToolKind::ListMedia, json!({"query": {"sort": "createdAt"}})).await);
    assert_eq!(result["path"], "/api/upload/files?sort=createdAt&pagination[page]=1&pagination[pageSize]=25");
}

#[tokio::test]
async fn test_bulk_replace_through_the_registry() {
    let root = tempdir().unwrap();
    let backend = Arc::new(FakeBackend::new(|path, method, _| match method {
        HttpMethod::Get if path.contains("pagination[page]=1&") => Ok(json!({
            "data": [
                {"id": 1, "url": "/uploads/a.png"},
                {"id": 2, "url": "https://old.example.com/uploads/b.png"},
                {"id": "3", "url": "https://old.example.com/uploads/c.png"}
            ]
        })),
        HttpMethod::Put if path.ends_with("/3") => Err(BackendError::Status {
            status: 404,
            body: json!({"error": "Not Found"}),
        }),
        _ => Ok(json!({})),
    }));
    let ctx = context(root.path(), backend.clone());

    let report = assert_ok!(call(&ctx, ToolKind::BulkReplaceMediaUrls, json!({
        "old_prefix": "https://old.example.com",
        "new_prefix": "https://new.example.com"
    })).await);

    assert_eq!(report["totalScanned"], 3);
    assert_eq!(report["totalMatched"], 2);
    assert_eq!(report["totalUpdated"], 1);
    assert_eq!(report["pagesFetched"], 1);
    assert_eq!(report["failures"][0]["id"], "3");

    let calls = backend.calls();
    assert_eq!(calls.len(), 3);
    assert_eq!(calls[1].path, "/api/upload/files/2");
    assert_eq!(calls[1].body.as_ref().unwrap()["url"], "https://new.example.com/uploads/b.png");
}

#[tokio::test]
async fn test_local_tools_through_the_transport() {
    let root = tempdir().unwrap();
    let schema = root.path().join("src/api/article/content-types/article/schema.json");
    std::fs::create_dir_all(schema.parent().unwrap()).unwrap();
    std::fs::write(
        &schema,
        r#"{"kind": "collectionType", "info": {"displayName": "Article", "pluralName": "articles"}, "attributes": {"title": {"type": "string"}}}"#,
    )
    .unwrap();
    std::fs::create_dir_all(root.path().join("src/plugins/todo/server")).unwrap();
    std::fs::write(root.path().join("src/plugins/todo/package.json"), "{}").unwrap();

    let input = [
        json!({"jsonrpc": "2.0", "id": 1, "method": "tools/call", "params": {"name": "list_content_types"}}),
        json!({"jsonrpc": "2.0", "id": 2, "method": "tools/call", "params": {"name": "get_content_type_schema", "arguments": {"content_type": "api::article.article"}}}),
        json!({"jsonrpc": "2.0", "id": 3, "method": "tools/call", "params": {"name": "list_components", "arguments": {}}}),
        json!({"jsonrpc": "2.0", "id": 4, "method": "tools/call", "params": {"name": "get_plugin_structure", "arguments": {"plugin": "todo"}}}),
        json!({"jsonrpc": "2.0", "id": 5, "method": "tools/call", "params": {"name": "get_plugin_structure", "arguments": {"plugin": "missing"}}}),
    ]
    .iter()
    .map(|m| m.to_string() + "\n")
    .collect::<String>();

    let backend = Arc::new(FakeBackend::echo());
    let responses = run_session(backend.clone(), root.path(), &input).await;
    assert_eq!(responses.len(), 5);

    let listed = tool_payload(response_for(&responses, json!(1)));
    assert_eq!(listed["contentTypes"][0]["uid"], "api::article.article");

    let schema = tool_payload(response_for(&responses, json!(2)));
    assert_eq!(schema["schema"]["attributes"]["title"]["type"], "string");

    // No components directory: descriptive result, not a failure
    let components = response_for(&responses, json!(3));
    assert!(components["result"].get("isError").is_none());
    assert_eq!(tool_payload(components)["count"], 0);

    let plugin = tool_payload(response_for(&responses, json!(4)));
    assert_eq!(plugin["found"], true);
    assert_eq!(plugin["tree"]["name"], "todo");
    assert_eq!(plugin["tree"]["children"][0]["name"], "package.json");
    assert_eq!(plugin["tree"]["children"][1]["type"], "directory");

    assert_eq!(tool_payload(response_for(&responses, json!(5)))["found"], false);

    // Local tools never touch the backend
    assert!(backend.calls().is_empty());
}
