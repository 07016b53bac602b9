/// End-to-end tests of the line transport and dispatcher
use super::support::*;
use serde_json::{json, Value};
use std::io::Write;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use strapi_mcp::*;
use tempfile::tempdir;

fn lines(messages: &[Value]) -> String {
    messages
        .iter()
        .map(|m| serde_json::to_string(m).unwrap() + "\n")
        .collect()
}

#[tokio::test]
async fn test_handshake_listing_and_notification() {
    let root = tempdir().unwrap();
    let input = lines(&[
        json!({"jsonrpc": "2.0", "id": 1, "method": "initialize", "params": {"protocolVersion": "2024-11-05", "capabilities": {}, "clientInfo": {"name": "test", "version": "0"}}}),
        json!({"jsonrpc": "2.0", "method": "notifications/initialized"}),
        json!({"jsonrpc": "2.0", "id": "list", "method": "tools/list"}),
        json!({"jsonrpc": "2.0", "id": 3, "method": "ping"}),
    ]);

    let responses = run_session(Arc::new(FakeBackend::echo()), root.path(), &input).await;

    // The notification produces nothing
    assert_eq!(responses.len(), 3);

    let init = response_for(&responses, json!(1));
    assert_eq!(init["jsonrpc"], "2.0");
    assert_eq!(init["result"]["protocolVersion"], "2024-11-05");
    assert_eq!(init["result"]["serverInfo"]["name"], "strapi-mcp");

    let list = response_for(&responses, json!("list"));
    let tools = list["result"]["tools"].as_array().unwrap();
    assert_eq!(tools.len(), ToolKind::ALL.len());
    assert_eq!(tools[0]["name"], "list_content_types");
    assert!(tools.iter().all(|t| t["inputSchema"]["type"] == "object"));

    assert_eq!(response_for(&responses, json!(3))["result"], json!({}));
}

#[tokio::test]
async fn test_malformed_line_produces_no_output_and_one_log() {
    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    let logs = CapturedLogs::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer({
            let logs = logs.clone();
            move || logs.clone()
        })
        .with_ansi(false)
        .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    let root = tempdir().unwrap();
    let responses = run_session(
        Arc::new(FakeBackend::echo()),
        root.path(),
        "{\"jsonrpc\": \"2.0\", \"id\": 1, \"method\": \n",
    )
    .await;

    assert!(responses.is_empty());

    let captured = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
    let parse_errors = captured
        .lines()
        .filter(|l| l.contains("Failed to parse JSON-RPC message"))
        .count();
    assert_eq!(parse_errors, 1, "captured logs:\n{}", captured);
    assert_eq!(captured.lines().filter(|l| l.contains("ERROR")).count(), 1);
}

#[tokio::test]
async fn test_bad_lines_do_not_stop_the_loop() {
    let root = tempdir().unwrap();
    let input = format!(
        "not json at all\n\n   \n{}{}",
        "{\"id\": 5, \"params\": {}}\n",
        lines(&[json!({"jsonrpc": "2.0", "id": 6, "method": "ping"})])
    );

    let responses = run_session(Arc::new(FakeBackend::echo()), root.path(), &input).await;
    assert_eq!(responses.len(), 2);

    // Parseable but not a request: answered because the id is known
    let invalid = response_for(&responses, json!(5));
    assert_eq!(invalid["error"]["code"], -32600);
    assert!(invalid.get("result").is_none());

    assert_eq!(response_for(&responses, json!(6))["result"], json!({}));
}

#[tokio::test]
async fn test_non_utf8_line_is_skipped() {
    let root = tempdir().unwrap();
    let mut input = b"\xff\xfe garbage\n".to_vec();
    input.extend_from_slice(lines(&[json!({"jsonrpc": "2.0", "id": 1, "method": "ping"})]).as_bytes());

    let responses = run_session(Arc::new(FakeBackend::echo()), root.path(), &input).await;
    assert_eq!(responses.len(), 1);
    assert_eq!(response_for(&responses, json!(1))["result"], json!({}));
}

#[tokio::test]
async fn test_unknown_method_and_tool_are_protocol_errors() {
    let root = tempdir().unwrap();
    let input = lines(&[
        json!({"jsonrpc": "2.0", "id": 1, "method": "resources/list"}),
        json!({"jsonrpc": "2.0", "id": 2, "method": "tools/call", "params": {"name": "drop_database", "arguments": {}}}),
    ]);

    let responses = run_session(Arc::new(FakeBackend::echo()), root.path(), &input).await;

    for id in [1, 2] {
        let response = response_for(&responses, json!(id));
        assert_eq!(response["error"]["code"], -32601);
        assert!(response.get("result").is_none());
    }
    assert!(response_for(&responses, json!(2))["error"]["message"]
        .as_str()
        .unwrap()
        .contains("drop_database"));
}

#[tokio::test]
async fn test_failing_tool_is_flagged_success() {
    let root = tempdir().unwrap();
    let backend = FakeBackend::new(|_, _, _| {
        Err(BackendError::Status {
            status: 500,
            body: json!({"raw": "<html>oops</html>"}),
        })
    });
    let input = lines(&[json!({
        "jsonrpc": "2.0",
        "id": 9,
        "method": "tools/call",
        "params": {"name": "get_single_type", "arguments": {"singular_api_id": "homepage"}}
    })]);

    let responses = run_session(Arc::new(backend), root.path(), &input).await;
    let response = response_for(&responses, json!(9));

    assert!(response.get("error").is_none());
    assert_eq!(response["result"]["isError"], true);
    let text = response["result"]["content"][0]["text"].as_str().unwrap();
    assert!(text.starts_with("Error: "));
    assert!(text.contains("500"));
}

#[tokio::test]
async fn test_notification_tool_call_runs_silently() {
    let root = tempdir().unwrap();
    let backend = Arc::new(FakeBackend::echo());
    let input = lines(&[json!({
        "jsonrpc": "2.0",
        "method": "tools/call",
        "params": {"name": "query_entries", "arguments": {"plural_api_id": "articles"}}
    })]);

    let responses = run_session(backend.clone(), root.path(), &input).await;

    assert!(responses.is_empty());
    assert_eq!(backend.calls().len(), 1);
}

#[tokio::test]
async fn test_concurrent_calls_are_correlated_by_id() {
    let root = tempdir().unwrap();
    let backend = FakeBackend::echo().with_delay("/api/slow", Duration::from_millis(200));
    let input = lines(&[
        json!({"jsonrpc": "2.0", "id": 1, "method": "tools/call", "params": {"name": "query_entries", "arguments": {"plural_api_id": "slow"}}}),
        json!({"jsonrpc": "2.0", "id": 2, "method": "tools/call", "params": {"name": "query_entries", "arguments": {"plural_api_id": "fast"}}}),
    ]);

    let responses = run_session(Arc::new(backend), root.path(), &input).await;
    assert_eq!(responses.len(), 2);

    // Only per-id correctness is guaranteed, not ordering
    assert_eq!(tool_payload(response_for(&responses, json!(1)))["path"], "/api/slow");
    assert_eq!(tool_payload(response_for(&responses, json!(2)))["path"], "/api/fast");
}
