//! # JSON-RPC 2.0 Server Core
//!
//! Transport-agnostic building blocks for serving JSON-RPC 2.0 calls:
//! envelope types, the standard error codes, a method registry and the
//! dispatcher that turns request bytes into a [`DispatchOutcome`].
//!
//! Transports (see the `wirerpc-http` crate) fill a [`RequestContext`] with
//! their own metadata, call [`JsonRpcDispatcher::dispatch`] and encode the
//! outcome.
//!
//! ## Features
//! - Request ids of any JSON-RPC shape, with `id: null` kept distinct from a
//!   missing id
//! - Notifications run detached and never produce a response
//! - Typed handlers via [`EndpointHandler`]
//! - Domain errors carrying their own codes via [`ToJsonRpcError`]

pub mod context;
pub mod dispatch;
pub mod endpoint;
pub mod error;
pub mod handler;
pub mod prelude;
pub mod registry;
pub mod request;
pub mod response;
pub mod types;

// Re-export main types
pub use context::RequestContext;
pub use dispatch::{DispatchFailure, DispatchOutcome, JsonRpcDispatcher, ResultKind, classify_result};
pub use endpoint::EndpointHandler;
pub use error::{
    DecodeError, HandlerError, HandlerErrorKind, JsonRpcErrorCode, JsonRpcErrorObject,
    ToJsonRpcError, ValidationError,
};
pub use handler::{FunctionHandler, HandlerFuture, HandlerResponse, JsonRpcHandler};
pub use registry::HandlerRegistry;
pub use request::{JsonRpcRequest, RequestParams};
pub use response::JsonRpcResponse;
pub use types::{JsonRpcVersion, RequestId, RequestIdError};

/// JSON-RPC 2.0 version constant
pub const JSONRPC_VERSION: &str = "2.0";

/// Standard JSON-RPC 2.0 error codes
pub mod error_codes {
    pub const PARSE_ERROR: i64 = -32700;
    pub const INVALID_REQUEST: i64 = -32600;
    pub const METHOD_NOT_FOUND: i64 = -32601;
    pub const INVALID_PARAMS: i64 = -32602;
    pub const INTERNAL_ERROR: i64 = -32603;
}
