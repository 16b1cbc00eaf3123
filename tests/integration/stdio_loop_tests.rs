//! Integration tests for the line-delimited JSON-RPC loop.
//!
//! Feeds scripted input through `serve_lines` and inspects every line
//! written back.

use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Value};
use tokio::io::AsyncWriteExt;
use tokio_util::sync::CancellationToken;

use denovibe::errors::{INTERNAL_ERROR, INVALID_REQUEST, METHOD_NOT_FOUND, PARSE_ERROR};
use denovibe::mcp::dispatcher::McpDispatcher;
use denovibe::mcp::transport::{handle_line, serve_lines};
use denovibe::process::runner::CommandRunner;

use crate::support::{fail, ok, panicking_dispatcher, stub_dispatcher};

/// Run the loop over `input` to end of stream and return the parsed responses.
async fn run_session<R>(dispatcher: Arc<McpDispatcher<R>>, input: &str) -> Vec<Value>
where
    R: CommandRunner + 'static,
{
    let mut out: Vec<u8> = Vec::new();
    serve_lines(input.as_bytes(), &mut out, dispatcher, CancellationToken::new())
        .await
        .expect("loop ends cleanly at end of input");

    let text = String::from_utf8(out).expect("utf8 output");
    assert!(text.is_empty() || text.ends_with('\n'), "every response is newline-terminated");
    text.lines()
        .map(|line| serde_json::from_str(line).expect("each output line is JSON"))
        .collect()
}

#[tokio::test]
async fn initialize_then_list() {
    let input = concat!(
        r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{"protocolVersion":"2024-11-05"}}"#,
        "\n",
        r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#,
        "\n",
        r#"{"jsonrpc":"2.0","id":2,"method":"tools/list"}"#,
        "\n",
    );
    let responses = run_session(stub_dispatcher(vec![]), input).await;

    assert_eq!(responses.len(), 2, "notification gets no response");
    assert_eq!(responses[0]["id"], 1);
    assert_eq!(responses[0]["result"]["serverInfo"]["name"], "denovibe-tools");
    assert_eq!(responses[1]["id"], 2);
    assert_eq!(
        responses[1]["result"]["tools"]
            .as_array()
            .expect("tools array")
            .len(),
        6
    );
}

#[tokio::test]
async fn malformed_line_is_answered_and_loop_continues() {
    let input = concat!(
        "{not json\n",
        r#"{"jsonrpc":"2.0","id":7,"method":"tools/list"}"#,
        "\n",
    );
    let responses = run_session(stub_dispatcher(vec![]), input).await;

    assert_eq!(responses.len(), 2);
    assert_eq!(
        responses[0],
        json!({
            "jsonrpc": "2.0",
            "id": null,
            "error": { "code": PARSE_ERROR, "message": "Parse error" }
        })
    );
    assert_eq!(responses[1]["id"], 7);
    assert!(responses[1].get("result").is_some());
}

#[tokio::test]
async fn non_request_json_is_invalid_request() {
    let input = "[1,2,3]\n{\"id\":3}\n42\n";
    let responses = run_session(stub_dispatcher(vec![]), input).await;

    assert_eq!(responses.len(), 3);
    for response in &responses {
        assert_eq!(response["id"], Value::Null);
        assert_eq!(response["error"]["code"], INVALID_REQUEST);
        assert_eq!(response["error"]["message"], "Invalid Request");
    }
}

#[tokio::test]
async fn ids_are_echoed_verbatim() {
    let input = concat!(
        r#"{"jsonrpc":"2.0","id":"abc-123","method":"tools/list"}"#,
        "\n",
        r#"{"jsonrpc":"2.0","id":99,"method":"initialize"}"#,
        "\n",
        r#"{"jsonrpc":"2.0","method":"tools/list"}"#,
        "\n",
    );
    let responses = run_session(stub_dispatcher(vec![]), input).await;

    assert_eq!(responses[0]["id"], "abc-123");
    assert_eq!(responses[1]["id"], 99);
    assert_eq!(responses[2]["id"], Value::Null, "absent id is echoed as null");
}

#[tokio::test]
async fn unknown_method_is_method_not_found() {
    let input = r#"{"jsonrpc":"2.0","id":4,"method":"resources/list"}"#.to_owned() + "\n";
    let responses = run_session(stub_dispatcher(vec![]), &input).await;

    assert_eq!(responses.len(), 1);
    assert_eq!(responses[0]["id"], 4);
    assert_eq!(responses[0]["error"]["code"], METHOD_NOT_FOUND);
    assert_eq!(
        responses[0]["error"]["message"],
        "Method not found: resources/list"
    );
}

#[tokio::test]
async fn unknown_tool_is_a_tool_level_error() {
    let input = r#"{"jsonrpc":"2.0","id":5,"method":"tools/call","params":{"name":"nope","arguments":{}}}"#
        .to_owned()
        + "\n";
    let responses = run_session(stub_dispatcher(vec![]), &input).await;

    assert!(responses[0].get("error").is_none());
    assert_eq!(
        responses[0]["result"],
        json!({
            "content": [{ "type": "text", "text": "Unknown tool: nope" }],
            "isError": true
        })
    );
}

#[tokio::test]
async fn failing_tool_is_still_a_successful_response() {
    let input = r#"{"jsonrpc":"2.0","id":6,"method":"tools/call","params":{"name":"run_lint","arguments":{}}}"#
        .to_owned()
        + "\n";
    let responses = run_session(stub_dispatcher(vec![fail(1, "error: lint issue")]), &input).await;

    assert_eq!(
        responses[0]["result"],
        json!({
            "content": [{ "type": "text", "text": "Lint failed (exit code: 1)\n\nerror: lint issue" }],
            "isError": true
        })
    );
}

#[tokio::test]
async fn final_line_without_newline_is_processed() {
    let input = r#"{"jsonrpc":"2.0","id":8,"method":"tools/list"}"#;
    let responses = run_session(stub_dispatcher(vec![]), input).await;

    assert_eq!(responses.len(), 1);
    assert_eq!(responses[0]["id"], 8);
}

#[tokio::test]
async fn blank_and_crlf_lines() {
    let input = "\n   \r\n{\"jsonrpc\":\"2.0\",\"id\":9,\"method\":\"tools/list\"}\r\n\n";
    let responses = run_session(stub_dispatcher(vec![]), input).await;

    assert_eq!(responses.len(), 1);
    assert_eq!(responses[0]["id"], 9);
}

#[tokio::test]
async fn empty_input_writes_nothing() {
    let responses = run_session(stub_dispatcher(vec![]), "").await;
    assert!(responses.is_empty());
}

#[tokio::test]
async fn calls_are_handled_in_arrival_order() {
    let input = concat!(
        r#"{"jsonrpc":"2.0","id":1,"method":"tools/call","params":{"name":"run_tests"}}"#,
        "\n",
        r#"{"jsonrpc":"2.0","id":2,"method":"tools/call","params":{"name":"type_check"}}"#,
        "\n",
    );
    let dispatcher = stub_dispatcher(vec![ok("3 passed"), fail(1, "TS2322")]);
    let responses = run_session(Arc::clone(&dispatcher), input).await;

    assert_eq!(responses[0]["id"], 1);
    assert_eq!(
        responses[0]["result"]["content"][0]["text"],
        "Tests (exit code: 0)\n\n3 passed"
    );
    assert_eq!(responses[1]["id"], 2);
    assert_eq!(
        responses[1]["result"]["content"][0]["text"],
        "Type check failed (exit code: 1)\n\nTS2322"
    );
    assert_eq!(dispatcher.skills().runner().calls().len(), 2);
}

#[tokio::test]
async fn handler_panic_becomes_internal_error_and_loop_continues() {
    let input = concat!(
        r#"{"jsonrpc":"2.0","id":1,"method":"tools/call","params":{"name":"run_tests"}}"#,
        "\n",
        r#"{"jsonrpc":"2.0","id":2,"method":"tools/list"}"#,
        "\n",
    );
    let responses = run_session(panicking_dispatcher(), input).await;

    assert_eq!(responses.len(), 2);
    assert_eq!(responses[0]["id"], 1);
    assert_eq!(responses[0]["error"]["code"], INTERNAL_ERROR);
    assert!(responses[0]["error"]["message"]
        .as_str()
        .expect("message")
        .contains("tools/call handler aborted"));
    assert_eq!(responses[1]["id"], 2);
    assert!(responses[1].get("result").is_some());
}

#[tokio::test]
async fn oversized_line_is_parse_error_then_loop_continues() {
    let mut input = "x".repeat(denovibe::mcp::codec::MAX_LINE_BYTES + 1);
    input.push('\n');
    input.push_str(r#"{"jsonrpc":"2.0","id":10,"method":"tools/list"}"#);
    input.push('\n');

    let responses = run_session(stub_dispatcher(vec![]), &input).await;

    assert_eq!(responses.len(), 2);
    assert_eq!(responses[0]["error"]["code"], PARSE_ERROR);
    assert_eq!(responses[1]["id"], 10);
}

#[tokio::test]
async fn cancellation_stops_a_waiting_loop() {
    let (mut tx, rx) = tokio::io::duplex(1024);
    let ct = CancellationToken::new();
    let loop_ct = ct.clone();
    let dispatcher = stub_dispatcher(vec![]);

    let handle = tokio::spawn(async move {
        let mut out: Vec<u8> = Vec::new();
        let result = serve_lines(rx, &mut out, dispatcher, loop_ct).await;
        (result, out)
    });

    tx.write_all(b"{\"jsonrpc\":\"2.0\",\"id\":1,\"method\":\"tools/list\"}\n")
        .await
        .expect("write request");
    tokio::time::sleep(Duration::from_millis(50)).await;
    ct.cancel();

    let (result, out) = tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("loop stops after cancellation")
        .expect("task joins");
    result.expect("cancelled loop returns Ok");
    let text = String::from_utf8(out).expect("utf8");
    assert_eq!(text.lines().count(), 1, "request before cancellation was answered");
    drop(tx);
}

#[tokio::test]
async fn handle_line_skips_notifications_and_blanks() {
    let dispatcher = stub_dispatcher(vec![]);

    assert!(handle_line("", &dispatcher).await.is_none());
    assert!(handle_line("   ", &dispatcher).await.is_none());
    assert!(handle_line(
        r#"{"jsonrpc":"2.0","method":"notifications/cancelled","params":{"requestId":1}}"#,
        &dispatcher
    )
    .await
    .is_none());
    assert!(dispatcher.skills().runner().calls().is_empty());
}
