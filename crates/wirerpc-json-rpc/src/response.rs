use http::HeaderMap;
use serde::Serialize;
use serde_json::value::RawValue;

use crate::error::JsonRpcErrorObject;
use crate::types::{JsonRpcVersion, RequestId};

/// A JSON-RPC response envelope.
///
/// Exactly one of `result` and `error` is set by the constructors. `id` is
/// omitted from the wire only when the request carried none; a null id is
/// echoed as `"id":null`. Outbound headers travel beside the body and are
/// never serialized.
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcResponse {
    #[serde(rename = "jsonrpc")]
    version: JsonRpcVersion,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<Box<RawValue>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<JsonRpcErrorObject>,
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<RequestId>,
    #[serde(skip)]
    headers: HeaderMap,
}

impl JsonRpcResponse {
    pub fn success(id: Option<RequestId>, result: Box<RawValue>) -> Self {
        Self {
            version: JsonRpcVersion::V2_0,
            result: Some(result),
            error: None,
            id,
            headers: HeaderMap::new(),
        }
    }

    pub fn error(id: Option<RequestId>, error: JsonRpcErrorObject) -> Self {
        Self {
            version: JsonRpcVersion::V2_0,
            result: None,
            error: Some(error),
            id,
            headers: HeaderMap::new(),
        }
    }

    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    pub fn result(&self) -> Option<&RawValue> {
        self.result.as_deref()
    }

    pub fn error_object(&self) -> Option<&JsonRpcErrorObject> {
        self.error.as_ref()
    }

    pub fn id(&self) -> Option<&RequestId> {
        self.id.as_ref()
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    /// Serialize the JSON body.
    pub fn to_vec(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;

    fn raw(json: &str) -> Box<RawValue> {
        RawValue::from_string(json.to_string()).unwrap()
    }

    #[test]
    fn test_success_serialization() {
        let response = JsonRpcResponse::success(Some(RequestId::Number(1)), raw(r#""woohoo""#));
        assert_eq!(
            String::from_utf8(response.to_vec().unwrap()).unwrap(),
            r#"{"jsonrpc":"2.0","result":"woohoo","id":1}"#
        );
        assert!(!response.is_error());
    }

    #[test]
    fn test_null_id_is_echoed() {
        let response = JsonRpcResponse::success(Some(RequestId::Null), raw(r#""woohoo""#));
        assert_eq!(
            String::from_utf8(response.to_vec().unwrap()).unwrap(),
            r#"{"jsonrpc":"2.0","result":"woohoo","id":null}"#
        );
    }

    #[test]
    fn test_absent_id_is_omitted() {
        let response = JsonRpcResponse::error(None, JsonRpcErrorObject::internal_error());
        assert_eq!(
            String::from_utf8(response.to_vec().unwrap()).unwrap(),
            r#"{"jsonrpc":"2.0","error":{"code":-32603,"message":"Internal JSON-RPC error"}}"#
        );
        assert!(response.is_error());
        assert!(response.result().is_none());
    }

    #[test]
    fn test_unparseable_id_is_echoed_as_null() {
        let id = RequestId::parse(b"true").unwrap();
        let response = JsonRpcResponse::error(Some(id), JsonRpcErrorObject::invalid_request());
        let body = String::from_utf8(response.to_vec().unwrap()).unwrap();
        assert!(body.ends_with(r#","id":null}"#), "{}", body);
    }

    #[test]
    fn test_headers_are_not_serialized() {
        let mut response = JsonRpcResponse::success(Some(RequestId::from("a")), raw("{}"));
        response
            .headers_mut()
            .insert("x-reqid", HeaderValue::from_static("124"));

        let body = String::from_utf8(response.to_vec().unwrap()).unwrap();
        assert_eq!(body, r#"{"jsonrpc":"2.0","result":{},"id":"a"}"#);
        assert_eq!(response.headers().get("x-reqid").unwrap(), "124");
    }
}
