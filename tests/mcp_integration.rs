//! Integration tests for the MCP engine with the real providers.
//!
//! Each test drives a live session over in-memory duplex streams, exactly
//! as a client would over stdio.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use serde_json::{json, Value};
use tokio::io::{duplex, AsyncBufReadExt, AsyncWriteExt, BufReader, DuplexStream, Lines};

use mathviz_mcp::config::Config;
use mathviz_mcp::mcp::protocol::{parse_message, IncomingMessage, RequestId};
use mathviz_mcp::mcp::registry::{ToolDescriptor, ToolError, ToolOutcome, ToolRegistry};
use mathviz_mcp::mcp::schema::{InputSchema, PropertySchema};
use mathviz_mcp::mcp::{Dispatcher, McpServer, ResourceRegistry, Session, Transport};
use mathviz_mcp::providers::{build_registries, example_calls};

// =============================================================================
// Test client
// =============================================================================

struct Client {
    tx: DuplexStream,
    rx: Lines<BufReader<DuplexStream>>,
    next_id: i64,
}

impl Client {
    fn spawn(tools: ToolRegistry, resources: ResourceRegistry) -> Self {
        let (client_out, server_in) = duplex(1 << 16);
        let (server_out, client_in) = duplex(1 << 16);

        let dispatcher = Dispatcher::new(tools, resources);
        let transport = Transport::new(BufReader::new(server_in), server_out);
        tokio::spawn(async move { McpServer::new(transport, dispatcher).serve().await });

        Self {
            tx: client_out,
            rx: BufReader::new(client_in).lines(),
            next_id: 0,
        }
    }

    fn with_config(config: &Config) -> Self {
        let (tools, resources) = build_registries(config).unwrap();
        Self::spawn(tools, resources)
    }

    async fn ready(config: &Config) -> Self {
        let mut client = Self::with_config(config);
        client.handshake().await;
        client
    }

    async fn send_raw(&mut self, line: &str) {
        self.tx.write_all(line.as_bytes()).await.unwrap();
        self.tx.write_all(b"\n").await.unwrap();
    }

    async fn recv(&mut self) -> Value {
        let line = self.rx.next_line().await.unwrap().expect("server closed the stream");
        serde_json::from_str(&line).unwrap()
    }

    async fn notify(&mut self, method: &str) {
        let message = json!({"jsonrpc": "2.0", "method": method});
        self.send_raw(&message.to_string()).await;
    }

    async fn request(&mut self, method: &str, params: Value) -> Value {
        self.next_id += 1;
        let message = json!({
            "jsonrpc": "2.0",
            "id": self.next_id,
            "method": method,
            "params": params
        });
        self.send_raw(&message.to_string()).await;
        let response = self.recv().await;
        assert_eq!(response["id"], json!(self.next_id));
        response
    }

    async fn handshake(&mut self) -> Value {
        let response = self
            .request(
                "initialize",
                json!({
                    "protocolVersion": "2024-11-05",
                    "capabilities": {},
                    "clientInfo": {"name": "test-client", "version": "1.0.0"}
                }),
            )
            .await;
        self.notify("notifications/initialized").await;
        response
    }

    async fn call(&mut self, name: &str, arguments: Value) -> Value {
        self.request("tools/call", json!({"name": name, "arguments": arguments}))
            .await
    }
}

fn error_code(response: &Value) -> i64 {
    response["error"]["code"].as_i64().unwrap_or_else(|| panic!("not an error: {response}"))
}

// =============================================================================
// Protocol Parsing Tests
// =============================================================================

#[test]
fn test_parse_tools_call_request() {
    let json = r#"{
        "jsonrpc": "2.0",
        "id": "abc",
        "method": "tools/call",
        "params": {"name": "basic_arithmetic", "arguments": {"operation": "add", "a": 1, "b": 2}}
    }"#;

    match parse_message(json).unwrap() {
        IncomingMessage::Request(req) => {
            assert_eq!(req.method, "tools/call");
            assert_eq!(req.id, RequestId::String("abc".to_string()));
        }
        IncomingMessage::Notification(_) => panic!("Expected Request"),
    }
}

#[test]
fn test_parse_invalid_json() {
    assert!(parse_message("not valid json").is_err());
}

// =============================================================================
// Lifecycle Tests
// =============================================================================

#[tokio::test]
async fn test_initialize_advertises_capabilities() {
    let mut client = Client::with_config(&Config::default());
    let response = client.handshake().await;

    let result = &response["result"];
    assert_eq!(result["protocolVersion"], "2024-11-05");
    assert_eq!(result["serverInfo"]["name"], "mathviz-mcp");
    assert_eq!(result["capabilities"]["tools"]["listChanged"], false);
    assert!(result["capabilities"]["resources"].is_object());

    let pong = client.request("ping", json!({})).await;
    assert_eq!(pong["result"], json!({}));
}

#[tokio::test]
async fn test_resources_capability_omitted_without_resources() {
    let mut config = Config::default();
    config.providers.resources = false;

    let mut client = Client::with_config(&config);
    let response = client.handshake().await;
    assert!(response["result"]["capabilities"].get("resources").is_none());
}

#[tokio::test]
async fn test_requests_before_initialize_are_rejected() {
    let mut client = Client::with_config(&Config::default());

    let response = client.request("tools/list", json!({})).await;
    assert_eq!(error_code(&response), -32600);
    assert!(response["error"]["message"].as_str().unwrap().contains("not initialized"));

    // Between initialize and initialized the gate is still closed
    client
        .request("initialize", json!({"protocolVersion": "2024-11-05", "capabilities": {}}))
        .await;
    let response = client
        .call("basic_arithmetic", json!({"operation": "add", "a": 1, "b": 1}))
        .await;
    assert_eq!(error_code(&response), -32600);
}

#[tokio::test]
async fn test_second_initialize_is_rejected() {
    let mut client = Client::ready(&Config::default()).await;
    let response = client
        .request("initialize", json!({"protocolVersion": "2024-11-05", "capabilities": {}}))
        .await;
    assert_eq!(error_code(&response), -32600);
}

#[tokio::test]
async fn test_notifications_are_never_answered() {
    let mut client = Client::ready(&Config::default()).await;

    // Unknown and failing notifications produce no output at all
    client.notify("notifications/cancelled").await;
    client.notify("initialized").await;
    client.notify("tools/list").await;

    let response = client.request("ping", json!({})).await;
    assert_eq!(response["id"], json!(client.next_id));
    assert_eq!(response["result"], json!({}));
}

// =============================================================================
// Framing Tests
// =============================================================================

#[tokio::test]
async fn test_parse_error_recovery() {
    let mut client = Client::ready(&Config::default()).await;

    client.send_raw("{this is not json").await;
    let response = client.recv().await;
    assert_eq!(error_code(&response), -32700);
    assert_eq!(response["id"], Value::Null);

    let response = client

        .call("basic_arithmetic", json!({"operation": "add", "a": 2, "b": 2}))

        .await;
    assert_eq!(response["result"]["result"], json!(4));
}

#[tokio::test]
async fn test_invalid_envelope_keeps_session() {
    let mut client = Client::ready(&Config::default()).await;

    client.send_raw(r#"{"jsonrpc":"1.0","id":9,"method":"ping"}"#).await;
    let response = client.recv().await;
    assert_eq!(error_code(&response), -32600);

    let response = client.request("ping", json!({})).await;
    assert_eq!(response["result"], json!({}));
}

#[tokio::test]
async fn test_responses_are_fifo() {
    let mut client = Client::ready(&Config::default()).await;

    // Pipeline a burst without waiting, mixing slow and fast tools
    let mut batch = String::new();
    for id in 100..120 {
        let arguments = if id % 2 == 0 {
            json!({"expression": "sin(x)", "num_points": 500})
        } else {
            json!({"expression": "1 + 1"})
        };
        let name = if id % 2 == 0 { "plot_function" } else { "evaluate_expression" };
        let message = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": "tools/call",
            "params": {"name": name, "arguments": arguments},
        });
        batch.push_str(&message.to_string());
        batch.push('\n');
    }
    client.tx.write_all(batch.as_bytes()).await.unwrap();

    for id in 100..120 {
        let response = client.recv().await;
        assert_eq!(response["id"], json!(id));
        assert!(response.get("result").is_some(), "{response}");
    }
}

#[tokio::test]
async fn test_stream_end_closes_session() {
    let mut client = Client::ready(&Config::default()).await;
    client.tx.shutdown().await.unwrap();
    assert!(client.rx.next_line().await.unwrap().is_none());
}

// =============================================================================
// Tool Tests
// =============================================================================

#[tokio::test]
async fn test_tools_list_includes_every_tool() {
    let mut client = Client::ready(&Config::default()).await;
    let response = client.request("tools/list", json!({})).await;

    let tools = response["result"]["tools"].as_array().unwrap();
    let names: Vec<_> = tools.iter().map(|t| t["name"].as_str().unwrap()).collect();
    assert_eq!(names.len(), 15);
    assert_eq!(names[0], "basic_arithmetic");
    assert!(names.contains(&"plot_function"));

    for tool in tools {
        assert_eq!(tool["inputSchema"]["type"], "object");
        assert!(tool["description"].as_str().is_some_and(|d| !d.is_empty()));
    }
}

#[tokio::test]
async fn test_addition() {
    let mut client = Client::ready(&Config::default()).await;
    let response = client
        .call("basic_arithmetic", json!({"operation": "add", "a": 15, "b": 27}))
        .await;

    let result = &response["result"];
    assert_eq!(result["result"], json!(42));
    assert!(result["explanation"].as_str().unwrap().contains("42"));
    assert!(result["steps"].is_array());

    let text = result["content"][0]["text"].as_str().unwrap();
    let embedded: Value = serde_json::from_str(text).unwrap();
    assert_eq!(embedded["result"], json!(42));
    assert_eq!(result["content"][0]["type"], "text");
}

#[tokio::test]
async fn test_quadratic_roots() {
    let mut client = Client::ready(&Config::default()).await;
    let response = client
        .call("solve_equations", json!({"equation_type": "quadratic", "a": 1, "b": -5, "c": 6}))
        .await;

    let mut roots: Vec<f64> = response["result"]["result"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r.as_f64().unwrap())
        .collect();
    roots.sort_by(f64::total_cmp);
    assert_eq!(roots, [2.0, 3.0]);
}

#[tokio::test]
async fn test_division_by_zero_is_a_tool_error() {
    let mut client = Client::ready(&Config::default()).await;
    let response = client
        .call("basic_arithmetic", json!({"operation": "divide", "a": 1, "b": 0}))
        .await;
    assert_eq!(error_code(&response), -32000);
    assert!(response.get("result").is_none());

    // The session survives
    let response = client.request("ping", json!({})).await;
    assert_eq!(response["result"], json!({}));
}

#[tokio::test]
async fn test_string_arguments_are_parsed() {
    let mut client = Client::ready(&Config::default()).await;
    let response = client
        .request(
            "tools/call",
            json!({"name": "percentages", "arguments": "{\"part\": 1, \"whole\": 4}"}),
        )
        .await;
    assert_eq!(response["result"]["result"], json!(25));

    let response = client
        .request("tools/call", json!({"name": "percentages", "arguments": "{oops"}))
        .await;
    assert_eq!(error_code(&response), -32602);
}

#[tokio::test]
async fn test_error_taxonomy() {
    let mut client = Client::ready(&Config::default()).await;

    let response = client.request("tools/frobnicate", json!({})).await;
    assert_eq!(error_code(&response), -32601);

    let response = client.call("no_such_tool", json!({})).await;
    assert_eq!(error_code(&response), -32001);

    let response = client

        .call("basic_arithmetic", json!({"operation": "modulo", "a": 1, "b": 2}))

        .await;
    assert_eq!(error_code(&response), -32602);

    let response = client.request("tools/call", json!({"arguments": {}})).await;
    assert_eq!(error_code(&response), -32602);

    let response = client.request("resources/read", json!({"uri": "math://nowhere"})).await;
    assert_eq!(error_code(&response), -32002);

    let response = client.request("resources/read", json!({})).await;
    assert_eq!(error_code(&response), -32602);
}

#[tokio::test]
async fn test_every_example_call_succeeds() {
    let mut client = Client::ready(&Config::default()).await;
    for (name, arguments) in example_calls() {
        let response = client.call(name, arguments).await;
        assert!(response.get("result").is_some(), "{name}: {response}");
        assert!(response["result"]["explanation"].is_string(), "{name}");
    }
}

#[tokio::test]
async fn test_invalid_calls_never_reach_the_handler() {
    let counter = Arc::new(AtomicUsize::new(0));
    let (mut tools, resources) = build_registries(&Config::default()).unwrap();

    let sentinel = Arc::clone(&counter);
    tools
        .register(
            ToolDescriptor::new(
                "sentinel",
                "Counts its calls",
                InputSchema::new().required("n", PropertySchema::integer()),
            ),
            move |_: &Value| -> Result<ToolOutcome, ToolError> {
                sentinel.fetch_add(1, Ordering::SeqCst);
                Ok(ToolOutcome::new(0, "counted"))
            },
        )
        .unwrap();

    let mut client = Client::spawn(tools, resources);
    client.handshake().await;

    let response = client.call("sentinel", json!({"n": "one"})).await;
    assert_eq!(error_code(&response), -32602);
    let response = client.call("sentinel", json!({})).await;
    assert_eq!(error_code(&response), -32602);
    let response = client.call("sentinel_typo", json!({"n": 1})).await;
    assert_eq!(error_code(&response), -32001);
    assert_eq!(counter.load(Ordering::SeqCst), 0);

    let response = client.call("sentinel", json!({"n": 1})).await;
    assert_eq!(response["result"]["result"], json!(0));
    assert_eq!(counter.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_panicking_handler_is_an_internal_error() {
    let mut tools = ToolRegistry::new();
    tools
        .register(
            ToolDescriptor::new("explode", "Always panics", InputSchema::new()),
            |_: &Value| -> Result<ToolOutcome, ToolError> { panic!("boom") },
        )
        .unwrap();

    let mut client = Client::spawn(tools, ResourceRegistry::new());
    client.handshake().await;

    let response = client.call("explode", json!({})).await;
    assert_eq!(error_code(&response), -32603);

    let response = client.request("ping", json!({})).await;
    assert_eq!(response["result"], json!({}));
}

#[tokio::test]
async fn test_charts_are_written_when_enabled() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = Config::default();
    config.visualization.write_files = true;
    config.visualization.output_dir = dir.path().join("charts");

    let mut client = Client::ready(&config).await;
    let response = client
        .call("create_chart", json!({"chart_type": "line", "data": {"x": [1, 2], "y": [3, 4]}}))
        .await;

    let path = response["result"]["file_path"].as_str().unwrap();
    let written: Value = serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
    assert_eq!(written["chart_type"], "line_chart");
    assert_eq!(written["data"], response["result"]["result"]["data"]);
}

// =============================================================================
// Resource Tests
// =============================================================================

#[tokio::test]
async fn test_resources_list_and_read() {
    let mut client = Client::ready(&Config::default()).await;
    let response = client.request("resources/list", json!({})).await;

    let resources = response["result"]["resources"].as_array().unwrap();
    assert_eq!(resources.len(), 7);
    for resource in resources {
        let uri = resource["uri"].as_str().unwrap();
        let response = client.request("resources/read", json!({"uri": uri})).await;
        let content = &response["result"]["contents"][0];
        assert_eq!(content["uri"], uri);
        assert_eq!(content["mimeType"], resource["mimeType"]);
        assert!(content["text"].as_str().is_some_and(|t| !t.is_empty()));
    }
}

#[tokio::test]
async fn test_resource_reads_are_idempotent() {
    let mut client = Client::ready(&Config::default()).await;
    for uri in ["viz://examples/charts", "math://formulas/algebra"] {
        let first = client.request("resources/read", json!({"uri": uri})).await;
        let second = client.request("resources/read", json!({"uri": uri})).await;
        assert_eq!(first["result"], second["result"]);
    }
}

// =============================================================================
// Negotiation-free calls
// =============================================================================

#[test]
fn test_call_tool_without_session() {
    let (tools, resources) = build_registries(&Config::default()).unwrap();
    let dispatcher = Dispatcher::new(tools, resources);

    let result = dispatcher
        .call_tool("number_theory", &json!({"operation": "gcd", "a": 48, "b": 18}))
        .unwrap();
    assert_eq!(result["result"], json!(6));
    assert!(Session::pre_negotiated().is_ready());
}
