use std::fmt;

use serde::de::{DeserializeOwned, IgnoredAny, MapAccess, Visitor};
use serde::{Deserialize, Deserializer};
use serde_json::value::RawValue;

use crate::error::{DecodeError, JsonRpcErrorCode, JsonRpcErrorObject, ValidationError};
use crate::types::RequestId;

/// Reserved prefix for rpc-internal methods and extensions
pub const RESERVED_METHOD_PREFIX: &str = "rpc.";

/// The `params` member of a request, kept as undecoded JSON text
#[derive(Debug, Clone, Default)]
pub struct RequestParams(Option<Box<RawValue>>);

impl RequestParams {
    pub fn new(raw: Option<Box<RawValue>>) -> Self {
        Self(raw)
    }

    /// Build params from a JSON string, mostly useful in tests.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        RawValue::from_string(json.to_string()).map(|raw| Self(Some(raw)))
    }

    /// The raw JSON text, or an empty string when `params` was absent.
    pub fn get(&self) -> &str {
        self.0.as_deref().map(RawValue::get).unwrap_or("")
    }

    pub fn raw(&self) -> Option<&RawValue> {
        self.0.as_deref()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_none()
    }

    /// Decode into a domain type. Absent params decode as JSON `null`.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, JsonRpcErrorObject> {
        let json = match &self.0 {
            Some(raw) => raw.get(),
            None => "null",
        };
        serde_json::from_str(json).map_err(|err| {
            JsonRpcErrorObject::new(JsonRpcErrorCode::InvalidParams)
                .with_data(serde_json::Value::String(err.to_string()))
        })
    }
}

impl From<Box<RawValue>> for RequestParams {
    fn from(raw: Box<RawValue>) -> Self {
        Self(Some(raw))
    }
}

/// A decoded JSON-RPC request envelope.
///
/// Decoding does not validate; call [`JsonRpcRequest::validate`] before
/// routing. A request with `id == None` is a notification.
#[derive(Debug, Clone)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    pub method: String,
    pub params: RequestParams,
    pub id: Option<RequestId>,
}

impl JsonRpcRequest {
    pub fn new(method: impl Into<String>, params: RequestParams, id: Option<RequestId>) -> Self {
        Self {
            jsonrpc: crate::JSONRPC_VERSION.to_string(),
            method: method.into(),
            params,
            id,
        }
    }

    /// Decode a request from the body of a call.
    ///
    /// Fails for malformed JSON, for anything but a JSON object, and when
    /// `jsonrpc` or `method` hold a non-string value.
    pub fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        Ok(serde_json::from_slice(bytes)?)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.jsonrpc != crate::JSONRPC_VERSION {
            return Err(ValidationError::VersionMismatch(self.jsonrpc.clone()));
        }

        if let Some(id) = &self.id {
            id.check().map_err(|_| ValidationError::InvalidId)?;
        }

        if self.method.is_empty() {
            return Err(ValidationError::EmptyMethod);
        }
        if self.method.starts_with(RESERVED_METHOD_PREFIX) {
            return Err(ValidationError::ReservedMethod(self.method.clone()));
        }

        Ok(())
    }

    pub fn is_notification(&self) -> bool {
        self.id.is_none()
    }
}

impl<'de> Deserialize<'de> for JsonRpcRequest {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(RequestVisitor)
    }
}

struct RequestVisitor;

impl<'de> Visitor<'de> for RequestVisitor {
    type Value = JsonRpcRequest;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a JSON-RPC request object")
    }

    fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut jsonrpc = None;
        let mut method = None;
        let mut params = None;
        let mut id = None;

        while let Some(key) = map.next_key::<String>()? {
            match key.as_str() {
                // null reads as an empty string and fails validation later
                "jsonrpc" => jsonrpc = map.next_value::<Option<String>>()?,
                "method" => method = map.next_value::<Option<String>>()?,
                "params" => params = Some(map.next_value::<Box<RawValue>>()?),
                // Deserialized directly so that `null` stays a present id
                "id" => id = Some(map.next_value::<RequestId>()?),
                _ => {
                    map.next_value::<IgnoredAny>()?;
                }
            }
        }

        Ok(JsonRpcRequest {
            jsonrpc: jsonrpc.unwrap_or_default(),
            method: method.unwrap_or_default(),
            params: RequestParams(params),
            id,
        })
    }
}
