//! Per-call request context handed to handlers

use serde_json::{Map, Value};

use crate::request::JsonRpcRequest;
use crate::types::RequestId;

/// Metadata key for the transport verb (e.g. `POST`)
pub const META_HTTP_METHOD: &str = "http.method";
/// Metadata key for the request URI
pub const META_HTTP_URI: &str = "http.uri";
/// Metadata key for the peer address
pub const META_REMOTE_ADDR: &str = "http.remote_addr";

/// Context of one JSON-RPC call.
///
/// The transport fills in metadata before dispatch; the dispatcher then adds
/// the envelope fields once the request has been decoded.
///
/// # Examples
///
/// ```rust
/// use wirerpc_json_rpc::RequestContext;
/// use serde_json::json;
///
/// let mut ctx = RequestContext::new();
/// ctx.add_metadata("http.method", json!("POST"));
///
/// assert_eq!(ctx.metadata_str("http.method"), Some("POST"));
/// assert!(ctx.method().is_none());
/// ```
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    jsonrpc: Option<String>,
    method: Option<String>,
    id: Option<RequestId>,
    metadata: Map<String, Value>,
}

impl RequestContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the envelope fields of a decoded request.
    pub fn populate(&mut self, request: &JsonRpcRequest) {
        self.jsonrpc = Some(request.jsonrpc.clone());
        self.method = Some(request.method.clone());
        self.id = request.id.clone();
    }

    pub fn jsonrpc(&self) -> Option<&str> {
        self.jsonrpc.as_deref()
    }

    pub fn method(&self) -> Option<&str> {
        self.method.as_deref()
    }

    /// Id of the request; `None` for notifications and undecoded calls.
    pub fn id(&self) -> Option<&RequestId> {
        self.id.as_ref()
    }

    pub fn metadata(&self) -> &Map<String, Value> {
        &self.metadata
    }

    pub fn metadata_str(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).and_then(Value::as_str)
    }

    pub fn add_metadata(&mut self, key: impl Into<String>, value: Value) {
        self.metadata.insert(key.into(), value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_populate_request_context() {
        let cases = [
            (r#"{"jsonrpc":"2.0","id":1234,"method":"method"}"#, "method", Some(RequestId::Number(1234))),
            (r#"{"jsonrpc":"2.0","id":"string","method":"name"}"#, "name", Some(RequestId::from("string"))),
            (r#"{"jsonrpc":"2.0","id":null,"method":"name"}"#, "name", Some(RequestId::Null)),
            (r#"{"jsonrpc":"2.0","method":"name"}"#, "name", None),
        ];

        for (body, method, id) in cases {
            let request = JsonRpcRequest::decode(body.as_bytes()).unwrap();
            let mut ctx = RequestContext::new();
            ctx.populate(&request);

            assert_eq!(ctx.jsonrpc(), Some("2.0"));
            assert_eq!(ctx.method(), Some(method));
            assert_eq!(ctx.id(), id.as_ref());
        }
    }
}
