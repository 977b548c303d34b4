//! Encoding of failed calls into HTTP responses

use bytes::Bytes;
use http::header::CONTENT_TYPE;
use http::{HeaderValue, StatusCode};
use http_body_util::Full;
use hyper::Response;
use tracing::error;

use wirerpc_json_rpc::{HandlerError, JsonRpcErrorObject, JsonRpcResponse, RequestId};

use crate::JSON_CONTENT_TYPE;

/// Body written when an error response cannot be serialized.
const FALLBACK_ERROR_BODY: &str =
    "{\"jsonrpc\":\"2.0\",\"error\":{\"code\":-32603,\"message\":\"Internal JSON-RPC error\"}}\n";

/// Turns a terminal failure into the HTTP response sent to the caller.
///
/// `id` is the id of the failed request when it could be resolved, `None`
/// for undecodable bodies and notifications. Any
/// `Fn(Option<&RequestId>, &HandlerError) -> Response<Full<Bytes>>` closure
/// is an encoder.
pub trait ErrorEncoder: Send + Sync {
    fn encode(&self, id: Option<&RequestId>, error: &HandlerError) -> Response<Full<Bytes>>;
}

impl<F> ErrorEncoder for F
where
    F: Fn(Option<&RequestId>, &HandlerError) -> Response<Full<Bytes>> + Send + Sync,
{
    fn encode(&self, id: Option<&RequestId>, error: &HandlerError) -> Response<Full<Bytes>> {
        self(id, error)
    }
}

/// Writes the failure as a JSON-RPC error response with status 200.
///
/// The code and message come from the error object the failure exposes;
/// anything else is reported as a canonical internal error. Headers carried
/// by the failure are applied after the content type.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultErrorEncoder;

impl ErrorEncoder for DefaultErrorEncoder {
    fn encode(&self, id: Option<&RequestId>, err: &HandlerError) -> Response<Full<Bytes>> {
        let object = err
            .error_object()
            .cloned()
            .unwrap_or_else(JsonRpcErrorObject::internal_error);

        let body = match JsonRpcResponse::error(id.cloned(), object).to_vec() {
            Ok(mut body) => {
                body.push(b'\n');
                Bytes::from(body)
            }
            Err(ser_err) => {
                error!("Failed to serialize error response: {}", ser_err);
                Bytes::from_static(FALLBACK_ERROR_BODY.as_bytes())
            }
        };

        let mut response = Response::new(Full::new(body));
        *response.status_mut() = StatusCode::OK;
        let headers = response.headers_mut();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE));
        for (name, value) in err.headers() {
            headers.append(name.clone(), value.clone());
        }
        response
    }
}
