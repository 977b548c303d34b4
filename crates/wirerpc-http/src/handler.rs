//! HTTP request handler for JSON-RPC calls

use std::net::SocketAddr;
use std::sync::Arc;

use bytes::Bytes;
use http::header::{ALLOW, CONTENT_TYPE};
use http::{HeaderValue, Method, StatusCode};
use http_body::Body;
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::{Request, Response};
use serde_json::json;
use tracing::{debug, error, warn};

use wirerpc_json_rpc::context::{META_HTTP_METHOD, META_HTTP_URI, META_REMOTE_ADDR};
use wirerpc_json_rpc::{
    DispatchOutcome, HandlerError, JsonRpcDispatcher, JsonRpcErrorObject, JsonRpcResponse,
    RequestContext,
};

use crate::error_encoder::{DefaultErrorEncoder, ErrorEncoder};
use crate::{JSON_CONTENT_TYPE, Result, TEXT_CONTENT_TYPE};

/// Default limit on request bodies (1 MiB)
pub const DEFAULT_MAX_BODY_SIZE: usize = 1024 * 1024;

/// Error type of request bodies the handler accepts
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// HTTP handler for JSON-RPC requests
#[derive(Clone)]
pub struct JsonRpcHttpHandler {
    dispatcher: Arc<JsonRpcDispatcher>,
    error_encoder: Arc<dyn ErrorEncoder>,
    max_body_size: usize,
}

impl JsonRpcHttpHandler {
    /// Create a handler with the default error encoder and body limit
    pub fn new(dispatcher: JsonRpcDispatcher) -> Self {
        Self {
            dispatcher: Arc::new(dispatcher),
            error_encoder: Arc::new(DefaultErrorEncoder),
            max_body_size: DEFAULT_MAX_BODY_SIZE,
        }
    }

    /// Replace the encoder used for failed calls
    pub fn with_error_encoder(mut self, encoder: Arc<dyn ErrorEncoder>) -> Self {
        self.error_encoder = encoder;
        self
    }

    /// Set maximum request body size
    pub fn with_max_body_size(mut self, size: usize) -> Self {
        self.max_body_size = size;
        self
    }

    pub fn dispatcher(&self) -> &JsonRpcDispatcher {
        &self.dispatcher
    }

    pub fn max_body_size(&self) -> usize {
        self.max_body_size
    }

    /// Handle one HTTP request carrying a JSON-RPC call
    pub async fn handle<B>(&self, req: Request<B>) -> Response<Full<Bytes>>
    where
        B: Body<Data = Bytes>,
        B::Error: Into<BoxError>,
    {
        self.handle_from(req, None).await
    }

    /// Same as [`JsonRpcHttpHandler::handle`], recording the peer address in
    /// the request context.
    pub async fn handle_from<B>(
        &self,
        req: Request<B>,
        remote_addr: Option<SocketAddr>,
    ) -> Response<Full<Bytes>>
    where
        B: Body<Data = Bytes>,
        B::Error: Into<BoxError>,
    {
        if req.method() != Method::POST {
            warn!("Rejecting {} request: only POST is accepted", req.method());
            return method_not_allowed();
        }

        let (parts, body) = req.into_parts();

        let mut ctx = RequestContext::new();
        ctx.add_metadata(META_HTTP_METHOD, json!(parts.method.as_str()));
        ctx.add_metadata(META_HTTP_URI, json!(parts.uri.to_string()));
        if let Some(addr) = remote_addr {
            ctx.add_metadata(META_REMOTE_ADDR, json!(addr.to_string()));
        }

        // Reading stops as soon as the limit is crossed
        let body_bytes = match Limited::new(body, self.max_body_size).collect().await {
            Ok(collected) => collected.to_bytes(),
            Err(err) if err.is::<LengthLimitError>() => {
                warn!("Request body exceeds {} bytes", self.max_body_size);
                return plain_text(StatusCode::PAYLOAD_TOO_LARGE, "413 request body too large\n");
            }
            Err(err) => {
                warn!("Failed to read request body: {}", err);
                let parse_error = HandlerError::new(JsonRpcErrorObject::parse_error());
                return self.error_encoder.encode(None, &parse_error);
            }
        };

        match self.dispatcher.dispatch(ctx, parts.headers, &body_bytes).await {
            DispatchOutcome::Response(response) => match self.write_response(&response) {
                Ok(http_response) => {
                    debug!("Sending JSON-RPC response");
                    http_response
                }
                Err(err) => {
                    error!("Failed to encode JSON-RPC response: {}", err);
                    self.error_encoder
                        .encode(response.id(), &HandlerError::internal(err))
                }
            },
            DispatchOutcome::NoContent => {
                let mut response = Response::new(Full::new(Bytes::new()));
                *response.status_mut() = StatusCode::NO_CONTENT;
                response
            }
            DispatchOutcome::Failure(failure) => {
                self.error_encoder.encode(failure.id.as_ref(), &failure.error)
            }
        }
    }

    /// Handler headers first, then the JSON content type and body.
    fn write_response(&self, response: &JsonRpcResponse) -> Result<Response<Full<Bytes>>> {
        let mut body = response.to_vec()?;
        body.push(b'\n');

        let mut http_response = Response::new(Full::new(Bytes::from(body)));
        *http_response.status_mut() = StatusCode::OK;
        let headers = http_response.headers_mut();
        for (name, value) in response.headers() {
            headers.append(name.clone(), value.clone());
        }
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE));
        Ok(http_response)
    }
}

/// Plain-text transport rejection
pub(crate) fn plain_text(status: StatusCode, body: &'static str) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(Bytes::from_static(body.as_bytes())));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static(TEXT_CONTENT_TYPE));
    response
}

fn method_not_allowed() -> Response<Full<Bytes>> {
    let mut response = plain_text(StatusCode::METHOD_NOT_ALLOWED, "405 must POST\n");
    response
        .headers_mut()
        .insert(ALLOW, HeaderValue::from_static("POST"));
    response
}
