//! Contract tests for the `initialize` handshake.

use serde_json::json;

use denovibe::mcp::dispatcher::{PROTOCOL_VERSION, SERVER_NAME};
use denovibe::mcp::protocol::JsonRpcRequest;
use denovibe::mcp::transport::handle_line;

use crate::support::stub_dispatcher;

#[tokio::test]
async fn initialize_result_shape() {
    let dispatcher = stub_dispatcher(vec![]);
    let line = r#"{"jsonrpc":"2.0","id":0,"method":"initialize","params":{"protocolVersion":"2024-11-05","capabilities":{},"clientInfo":{"name":"test","version":"1"}}}"#;

    let response = handle_line(line, &dispatcher).await.expect("a response");
    let value = serde_json::to_value(&response).expect("serialize");

    assert_eq!(
        value,
        json!({
            "jsonrpc": "2.0",
            "id": 0,
            "result": {
                "protocolVersion": "2024-11-05",
                "capabilities": { "tools": {} },
                "serverInfo": { "name": "denovibe-tools", "version": env!("CARGO_PKG_VERSION") }
            }
        })
    );
}

#[test]
fn announced_constants() {
    assert_eq!(PROTOCOL_VERSION, "2024-11-05");
    assert_eq!(SERVER_NAME, "denovibe-tools");
}

#[tokio::test]
async fn initialize_ignores_params_and_repeats() {
    let dispatcher = stub_dispatcher(vec![]);
    let bare: JsonRpcRequest =
        serde_json::from_value(json!({ "jsonrpc": "2.0", "id": 1, "method": "initialize" }))
            .expect("request");

    let first = dispatcher.dispatch(&bare).await.expect("initialize");
    let second = dispatcher.dispatch(&bare).await.expect("initialize again");
    assert_eq!(first, second);
    assert!(dispatcher.skills().runner().calls().is_empty());
}

#[tokio::test]
async fn initialized_notification_gets_no_response() {
    let dispatcher = stub_dispatcher(vec![]);
    let response = handle_line(
        r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#,
        &dispatcher,
    )
    .await;
    assert!(response.is_none());
}
