use std::fmt;

use http::{HeaderMap, HeaderName, HeaderValue};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::error_codes;

/// JSON-RPC error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonRpcErrorCode {
    ParseError,
    InvalidRequest,
    MethodNotFound,
    InvalidParams,
    InternalError,
    /// Application-defined code
    Custom(i64),
}

impl JsonRpcErrorCode {
    pub fn from_code(code: i64) -> Self {
        match code {
            error_codes::PARSE_ERROR => JsonRpcErrorCode::ParseError,
            error_codes::INVALID_REQUEST => JsonRpcErrorCode::InvalidRequest,
            error_codes::METHOD_NOT_FOUND => JsonRpcErrorCode::MethodNotFound,
            error_codes::INVALID_PARAMS => JsonRpcErrorCode::InvalidParams,
            error_codes::INTERNAL_ERROR => JsonRpcErrorCode::InternalError,
            other => JsonRpcErrorCode::Custom(other),
        }
    }

    pub fn code(&self) -> i64 {
        match self {
            JsonRpcErrorCode::ParseError => error_codes::PARSE_ERROR,
            JsonRpcErrorCode::InvalidRequest => error_codes::INVALID_REQUEST,
            JsonRpcErrorCode::MethodNotFound => error_codes::METHOD_NOT_FOUND,
            JsonRpcErrorCode::InvalidParams => error_codes::INVALID_PARAMS,
            JsonRpcErrorCode::InternalError => error_codes::INTERNAL_ERROR,
            JsonRpcErrorCode::Custom(code) => *code,
        }
    }

    /// Fixed message for the standard codes, empty for custom ones.
    pub fn canonical_message(&self) -> &'static str {
        match self {
            JsonRpcErrorCode::ParseError => {
                "An error occurred on the server while parsing the JSON text"
            }
            JsonRpcErrorCode::InvalidRequest => "The JSON sent is not a valid Request object",
            JsonRpcErrorCode::MethodNotFound => "The method does not exist / is not available",
            JsonRpcErrorCode::InvalidParams => "Invalid method parameter(s)",
            JsonRpcErrorCode::InternalError => "Internal JSON-RPC error",
            JsonRpcErrorCode::Custom(_) => "",
        }
    }
}

impl From<i64> for JsonRpcErrorCode {
    fn from(code: i64) -> Self {
        JsonRpcErrorCode::from_code(code)
    }
}

impl fmt::Display for JsonRpcErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code(), self.canonical_message())
    }
}

/// JSON-RPC Error object, serialized as the `error` member of a response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcErrorObject {
    pub code: i64,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl JsonRpcErrorObject {
    /// Error with the canonical message of `code`.
    pub fn new(code: impl Into<JsonRpcErrorCode>) -> Self {
        let code = code.into();
        Self {
            code: code.code(),
            message: code.canonical_message().to_string(),
            data: None,
        }
    }

    /// Error with an explicit message, which wins over the canonical one.
    pub fn with_message(code: impl Into<JsonRpcErrorCode>, message: impl Into<String>) -> Self {
        Self {
            code: code.into().code(),
            message: message.into(),
            data: None,
        }
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn parse_error() -> Self {
        Self::new(JsonRpcErrorCode::ParseError)
    }

    pub fn invalid_request() -> Self {
        Self::new(JsonRpcErrorCode::InvalidRequest)
    }

    pub fn method_not_found() -> Self {
        Self::new(JsonRpcErrorCode::MethodNotFound)
    }

    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self::with_message(JsonRpcErrorCode::InvalidParams, message)
    }

    pub fn internal_error() -> Self {
        Self::new(JsonRpcErrorCode::InternalError)
    }

    pub fn error_code(&self) -> JsonRpcErrorCode {
        JsonRpcErrorCode::from_code(self.code)
    }
}

impl fmt::Display for JsonRpcErrorObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for JsonRpcErrorObject {}

/// Implemented by failures that carry their own JSON-RPC code and message.
pub trait ToJsonRpcError: std::error::Error + Send + Sync + 'static {
    fn to_error_object(&self) -> JsonRpcErrorObject;
}

impl ToJsonRpcError for JsonRpcErrorObject {
    fn to_error_object(&self) -> JsonRpcErrorObject {
        self.clone()
    }
}

/// Source of a [`HandlerError`]
#[derive(Debug, Error)]
pub enum HandlerErrorKind {
    /// Failure with its own code and message.
    #[error("{}", .0.message)]
    Rpc(JsonRpcErrorObject),

    /// Anything else; reported as an internal error.
    #[error(transparent)]
    Internal(Box<dyn std::error::Error + Send + Sync>),
}

/// Failure returned by a handler.
///
/// Domain errors implementing [`ToJsonRpcError`] convert with `?` and keep
/// their code. Other errors go through [`HandlerError::internal`] and are
/// reported as `InternalError`. Headers attached with
/// [`HandlerError::with_header`] are written by the default error encoder.
#[derive(Debug, Error)]
#[error("{kind}")]
pub struct HandlerError {
    #[source]
    kind: HandlerErrorKind,
    headers: HeaderMap,
}

impl HandlerError {
    pub fn new(error: JsonRpcErrorObject) -> Self {
        Self {
            kind: HandlerErrorKind::Rpc(error),
            headers: HeaderMap::new(),
        }
    }

    pub fn internal(error: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self {
            kind: HandlerErrorKind::Internal(error.into()),
            headers: HeaderMap::new(),
        }
    }

    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.append(name, value);
        self
    }

    pub fn kind(&self) -> &HandlerErrorKind {
        &self.kind
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// The exposed error object, if the failure carries one.
    pub fn error_object(&self) -> Option<&JsonRpcErrorObject> {
        match &self.kind {
            HandlerErrorKind::Rpc(error) => Some(error),
            HandlerErrorKind::Internal(_) => None,
        }
    }

    /// Wire error: the exposed object, otherwise a canonical internal error.
    pub fn to_error_object(&self) -> JsonRpcErrorObject {
        self.error_object()
            .cloned()
            .unwrap_or_else(JsonRpcErrorObject::internal_error)
    }
}

impl<E: ToJsonRpcError> From<E> for HandlerError {
    fn from(error: E) -> Self {
        HandlerError::new(error.to_error_object())
    }
}

/// Failure to turn request bytes into a [`JsonRpcRequest`](crate::JsonRpcRequest)
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("malformed JSON-RPC envelope: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<DecodeError> for JsonRpcErrorObject {
    fn from(_: DecodeError) -> Self {
        JsonRpcErrorObject::parse_error()
    }
}

/// Reason a decoded request is not a valid JSON-RPC 2.0 request
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("unsupported jsonrpc version {0:?}")]
    VersionMismatch(String),

    #[error("request id could not be parsed")]
    InvalidId,

    #[error("method name is empty")]
    EmptyMethod,

    #[error("method name {0:?} uses the reserved rpc. prefix")]
    ReservedMethod(String),
}

impl From<ValidationError> for JsonRpcErrorObject {
    fn from(_: ValidationError) -> Self {
        JsonRpcErrorObject::invalid_request()
    }
}
