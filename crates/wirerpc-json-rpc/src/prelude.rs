//! # JSON-RPC Server Prelude
//!
//! Re-exports of the types most handlers and transports need.
//!
//! ```rust
//! use wirerpc_json_rpc::prelude::*;
//! ```

// Envelopes
pub use crate::request::{JsonRpcRequest, RequestParams};
pub use crate::response::JsonRpcResponse;
pub use crate::types::{JsonRpcVersion, RequestId};

// Errors
pub use crate::error::{HandlerError, JsonRpcErrorCode, JsonRpcErrorObject, ToJsonRpcError};

// Handlers and dispatch
pub use crate::context::RequestContext;
pub use crate::dispatch::{DispatchFailure, DispatchOutcome, JsonRpcDispatcher};
pub use crate::endpoint::EndpointHandler;
pub use crate::handler::{FunctionHandler, HandlerResponse, JsonRpcHandler};
pub use crate::registry::HandlerRegistry;

// Standard error codes
pub use crate::error_codes::*;
