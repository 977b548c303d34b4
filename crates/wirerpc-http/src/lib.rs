//! # HTTP JSON-RPC Server
//!
//! HTTP transport for servers built on `wirerpc-json-rpc`.
//!
//! Every call is a `POST` whose body is one JSON-RPC request. Protocol
//! failures travel in the JSON-RPC `error` member of a `200` response; only
//! transport problems (wrong verb, unknown path, oversized body) are reported
//! through the HTTP status.
//!
//! ```rust,no_run
//! use wirerpc_http::JsonRpcHttpServer;
//! use wirerpc_json_rpc::{EndpointHandler, HandlerError, RequestContext};
//!
//! # async fn run() -> wirerpc_http::Result<()> {
//! let server = JsonRpcHttpServer::builder()
//!     .rpc_path("/rpc")
//!     .register(
//!         "ping",
//!         EndpointHandler::new(|_ctx: RequestContext, _req: serde_json::Value| async move {
//!             Ok::<_, HandlerError>("pong")
//!         }),
//!     )
//!     .build();
//! server.run().await
//! # }
//! ```

pub mod error_encoder;
pub mod handler;
pub mod prelude;
pub mod server;

// Re-export main types
pub use error_encoder::{DefaultErrorEncoder, ErrorEncoder};
pub use handler::{BoxError, DEFAULT_MAX_BODY_SIZE, JsonRpcHttpHandler};
pub use server::{JsonRpcHttpServer, JsonRpcHttpServerBuilder, ServerConfig};

// Re-export foundational types
pub use wirerpc_json_rpc::{HandlerRegistry, JsonRpcDispatcher, JsonRpcHandler};

/// Content type of every JSON-RPC response body
pub const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";

/// Content type of transport rejections
pub const TEXT_CONTENT_TYPE: &str = "text/plain; charset=utf-8";

/// Result type for HTTP JSON-RPC operations
pub type Result<T> = std::result::Result<T, HttpRpcError>;

/// HTTP transport errors
#[derive(Debug, thiserror::Error)]
pub enum HttpRpcError {
    #[error("HTTP error: {0}")]
    Http(#[from] hyper::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
