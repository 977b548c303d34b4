//! # HTTP JSON-RPC Server Prelude
//!
//! Re-exports of the server types together with the core handler types.
//!
//! ```rust
//! use wirerpc_http::prelude::*;
//! ```

// Core server types
pub use crate::error_encoder::{DefaultErrorEncoder, ErrorEncoder};
pub use crate::handler::JsonRpcHttpHandler;
pub use crate::server::{JsonRpcHttpServer, JsonRpcHttpServerBuilder, ServerConfig};

// Re-export foundational types
pub use wirerpc_json_rpc::prelude::*;

// Error types
pub use crate::{HttpRpcError, Result};
