//! HTTP JSON-RPC server
//!
//! Binds a TCP listener and serves every connection with hyper's HTTP/1
//! stack. Calls to the configured path go to a [`JsonRpcHttpHandler`];
//! anything else is answered with `404`.

use bytes::Bytes;
use http::StatusCode;
use http_body::Body;
use http_body_util::Full;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response};
use hyper_util::rt::TokioIo;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{debug, error, info};

use wirerpc_json_rpc::{HandlerRegistry, JsonRpcDispatcher, JsonRpcHandler};

use crate::error_encoder::{DefaultErrorEncoder, ErrorEncoder};
use crate::handler::{BoxError, DEFAULT_MAX_BODY_SIZE, JsonRpcHttpHandler, plain_text};
use crate::Result;

/// Configuration for the HTTP JSON-RPC server
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to
    pub bind_address: SocketAddr,
    /// Path of the JSON-RPC endpoint
    pub rpc_path: String,
    /// Maximum request body size
    pub max_body_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: SocketAddr::from(([127, 0, 0, 1], 8000)),
            rpc_path: "/".to_string(),
            max_body_size: DEFAULT_MAX_BODY_SIZE, // 1MB
        }
    }
}

/// Builder for the HTTP JSON-RPC server
pub struct JsonRpcHttpServerBuilder {
    config: ServerConfig,
    registry: HandlerRegistry,
    error_encoder: Arc<dyn ErrorEncoder>,
}

impl JsonRpcHttpServerBuilder {
    pub fn new() -> Self {
        Self {
            config: ServerConfig::default(),
            registry: HandlerRegistry::new(),
            error_encoder: Arc::new(DefaultErrorEncoder),
        }
    }

    /// Replace the whole configuration
    pub fn config(mut self, config: ServerConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the bind address
    pub fn bind_address(mut self, addr: SocketAddr) -> Self {
        self.config.bind_address = addr;
        self
    }

    /// Set the JSON-RPC endpoint path
    pub fn rpc_path(mut self, path: impl Into<String>) -> Self {
        self.config.rpc_path = path.into();
        self
    }

    /// Set maximum request body size
    pub fn max_body_size(mut self, size: usize) -> Self {
        self.config.max_body_size = size;
        self
    }

    /// Register a handler for one method.
    ///
    /// # Panics
    ///
    /// Panics if a handler for `method` is already registered.
    pub fn register<H>(mut self, method: impl Into<String>, handler: H) -> Self
    where
        H: JsonRpcHandler + 'static,
    {
        self.registry.register(method, handler);
        self
    }

    /// Use a registry built elsewhere, replacing any handlers registered so far
    pub fn registry(mut self, registry: HandlerRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Replace the encoder used for failed calls
    pub fn error_encoder<E>(mut self, encoder: E) -> Self
    where
        E: ErrorEncoder + 'static,
    {
        self.error_encoder = Arc::new(encoder);
        self
    }

    /// Build the server; the registry is frozen from here on
    pub fn build(self) -> JsonRpcHttpServer {
        let handler = JsonRpcHttpHandler::new(JsonRpcDispatcher::new(self.registry))
            .with_error_encoder(self.error_encoder)
            .with_max_body_size(self.config.max_body_size);

        JsonRpcHttpServer {
            config: self.config,
            handler: Arc::new(handler),
        }
    }
}

impl Default for JsonRpcHttpServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// HTTP JSON-RPC server
#[derive(Clone)]
pub struct JsonRpcHttpServer {
    config: ServerConfig,
    handler: Arc<JsonRpcHttpHandler>,
}

impl JsonRpcHttpServer {
    pub fn builder() -> JsonRpcHttpServerBuilder {
        JsonRpcHttpServerBuilder::new()
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn handler(&self) -> &JsonRpcHttpHandler {
        &self.handler
    }

    /// Bind the configured address and serve until an accept error
    pub async fn run(&self) -> Result<()> {
        let listener = TcpListener::bind(&self.config.bind_address).await?;
        self.serve(listener).await
    }

    /// Serve connections from an already bound listener
    pub async fn serve(&self, listener: TcpListener) -> Result<()> {
        let local_addr = listener.local_addr()?;
        info!("JSON-RPC server listening on {}", local_addr);
        info!("JSON-RPC endpoint available at: {}", self.config.rpc_path);
        info!("Registered methods: {:?}", self.handler.dispatcher().registry().methods());

        loop {
            let (stream, peer_addr) = listener.accept().await?;
            debug!("New connection from {}", peer_addr);

            let server = self.clone();
            tokio::spawn(async move {
                let io = TokioIo::new(stream);
                let service = service_fn(move |req| {
                    let server = server.clone();
                    async move { Ok::<_, Infallible>(server.route(req, Some(peer_addr)).await) }
                });

                if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                    if err.is_incomplete_message() {
                        debug!("Client disconnected (normal): {}", err);
                    } else {
                        error!("Error serving connection: {}", err);
                    }
                }
            });
        }
    }

    /// Route one request by path
    pub async fn route<B>(&self, req: Request<B>, remote_addr: Option<SocketAddr>) -> Response<Full<Bytes>>
    where
        B: Body<Data = Bytes>,
        B::Error: Into<BoxError>,
    {
        debug!("Handling {} {}", req.method(), req.uri().path());

        if req.uri().path() != self.config.rpc_path {
            return plain_text(StatusCode::NOT_FOUND, "404 page not found\n");
        }
        self.handler.handle_from(req, remote_addr).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::FutureExt;
    use http::Method;
    use http_body_util::BodyExt;
    use std::net::{IpAddr, Ipv4Addr};
    use wirerpc_json_rpc::{FunctionHandler, HandlerError, HandlerResponse, RequestId};

    fn woohoo() -> impl JsonRpcHandler {
        FunctionHandler::new(|_ctx, _headers, _params| {
            async move { HandlerResponse::json("woohoo") }.boxed()
        })
    }

    fn post(uri: &str, body: &'static str) -> Request<Full<Bytes>> {
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .body(Full::new(Bytes::from_static(body.as_bytes())))
            .unwrap()
    }

    #[test]
    fn test_server_config_default() {
        let config = ServerConfig::default();
        assert_eq!(config.bind_address, "127.0.0.1:8000".parse::<SocketAddr>().unwrap());
        assert_eq!(config.rpc_path, "/");
        assert_eq!(config.max_body_size, 1024 * 1024);
    }

    #[test]
    fn test_builder() {
        let addr = SocketAddr::new(IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)), 3000);
        let server = JsonRpcHttpServer::builder()
            .bind_address(addr)
            .rpc_path("/api/rpc")
            .max_body_size(2048)
            .register("a", woohoo())
            .register("b", woohoo())
            .build();

        assert_eq!(server.config().bind_address, addr);
        assert_eq!(server.config().rpc_path, "/api/rpc");
        assert_eq!(server.handler().max_body_size(), 2048);
        assert_eq!(
            server.handler().dispatcher().registry().methods(),
            vec!["a".to_string(), "b".to_string()]
        );
    }

    #[test]
    #[should_panic(expected = "Handler for method a already exists")]
    fn test_builder_rejects_duplicate_methods() {
        JsonRpcHttpServer::builder()
            .register("a", woohoo())
            .register("a", woohoo());
    }

    #[tokio::test]
    async fn test_unknown_path_is_not_found() {
        let server = JsonRpcHttpServer::builder()
            .rpc_path("/rpc")
            .register("test", woohoo())
            .build();

        let response = server
            .route(post("/other", r#"{"jsonrpc":"2.0","method":"test","id":1}"#), None)
            .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_rpc_path_is_served() {
        let server = JsonRpcHttpServer::builder()
            .rpc_path("/rpc")
            .register("test", woohoo())
            .build();

        let response = server
            .route(post("/rpc", r#"{"jsonrpc":"2.0","method":"test","id":null}"#), None)
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"{\"jsonrpc\":\"2.0\",\"result\":\"woohoo\",\"id\":null}\n");
    }

    #[tokio::test]
    async fn test_custom_error_encoder() {
        let server = JsonRpcHttpServer::builder()
            .error_encoder(|_id: Option<&RequestId>, err: &HandlerError| {
                let mut response = Response::new(Full::new(Bytes::from(err.to_string())));
                *response.status_mut() = StatusCode::BAD_REQUEST;
                response
            })
            .build();

        let response = server.route(post("/", "notjson"), None).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
