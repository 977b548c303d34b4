//! Typed Endpoint Integration Tests
//!
//! Serves `EndpointHandler`s over HTTP and checks params decoding, domain
//! errors and error-shaped results end to end.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use wirerpc_http::JsonRpcHttpServer;
use wirerpc_json_rpc::{
    EndpointHandler, HandlerError, HandlerRegistry, JsonRpcErrorObject, RequestContext,
    ToJsonRpcError,
};

/// Domain failure that carries its own JSON-RPC code.
#[derive(Debug, thiserror::Error)]
#[error("sum overflows i64")]
struct Overflow;

impl ToJsonRpcError for Overflow {
    fn to_error_object(&self) -> JsonRpcErrorObject {
        JsonRpcErrorObject::with_message(-32000i64, self.to_string()).with_data(json!({"op": "add"}))
    }
}

#[derive(Debug, Deserialize)]
struct AddRequest {
    a: i64,
    b: i64,
}

#[derive(Debug, Serialize)]
struct AddResponse {
    v: i64,
}

fn registry() -> HandlerRegistry {
    HandlerRegistry::new()
        .with(
            "add",
            EndpointHandler::new(|_ctx: RequestContext, req: AddRequest| async move {
                let v = req.a.checked_add(req.b).ok_or(Overflow)?;
                Ok::<_, HandlerError>(AddResponse { v })
            }),
        )
        .with(
            "validate",
            EndpointHandler::new(|_ctx: RequestContext, _req: Value| async move {
                Ok::<_, HandlerError>(JsonRpcErrorObject::invalid_params("field missing"))
            }),
        )
}

async fn start_server() -> (String, JoinHandle<()>) {
    let port = portpicker::pick_unused_port().expect("No available port");
    let listener = TcpListener::bind(("127.0.0.1", port))
        .await
        .expect("Failed to bind test port");

    let server = JsonRpcHttpServer::builder().registry(registry()).build();
    let handle = tokio::spawn(async move {
        server.serve(listener).await.ok();
    });

    (format!("http://127.0.0.1:{}/", port), handle)
}

async fn call(url: &str, body: Value) -> Value {
    reqwest::Client::new()
        .post(url)
        .json(&body)
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse JSON")
}

#[tokio::test]
async fn test_add_endpoint() {
    let (url, server_handle) = start_server().await;

    let body = call(
        &url,
        json!({"jsonrpc": "2.0", "method": "add", "params": {"a": 1, "b": 3}, "id": 1}),
    )
    .await;
    assert_eq!(body, json!({"jsonrpc": "2.0", "result": {"v": 4}, "id": 1}));

    server_handle.abort();
}

#[tokio::test]
async fn test_bad_params_are_invalid_params() {
    let (url, server_handle) = start_server().await;

    let body = call(
        &url,
        json!({"jsonrpc": "2.0", "method": "add", "params": {"a": "one"}, "id": 2}),
    )
    .await;
    assert_eq!(body["id"], 2);
    assert_eq!(body["error"]["code"], -32602);
    assert_eq!(body["error"]["message"], "Invalid method parameter(s)");
    assert!(body["error"]["data"].is_string());
    assert!(body.get("result").is_none());

    server_handle.abort();
}

#[tokio::test]
async fn test_domain_error_keeps_its_code() {
    let (url, server_handle) = start_server().await;

    let body = call(
        &url,
        json!({"jsonrpc": "2.0", "method": "add", "params": {"a": i64::MAX, "b": 1}, "id": "x"}),
    )
    .await;
    assert_eq!(
        body,
        json!({
            "jsonrpc": "2.0",
            "error": {"code": -32000, "message": "sum overflows i64", "data": {"op": "add"}},
            "id": "x"
        })
    );

    server_handle.abort();
}

#[tokio::test]
async fn test_error_shaped_endpoint_result() {
    let (url, server_handle) = start_server().await;

    let response = reqwest::Client::new()
        .post(&url)
        .body(r#"{"jsonrpc": "2.0", "method": "validate", "params": {"a": 1, "b": 3}, "id": 1}"#)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(
        response.text().await.unwrap(),
        "{\"jsonrpc\":\"2.0\",\"result\":{\"code\":-32602,\"message\":\"field missing\"},\"id\":1}\n"
    );

    server_handle.abort();
}
