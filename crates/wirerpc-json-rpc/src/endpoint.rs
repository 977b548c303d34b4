//! Typed handlers: decode `params`, run an endpoint, encode its response

use std::future::Future;
use std::marker::PhantomData;

use async_trait::async_trait;
use http::HeaderMap;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::warn;

use crate::context::RequestContext;
use crate::error::HandlerError;
use crate::handler::{HandlerResponse, JsonRpcHandler};
use crate::request::RequestParams;

/// Handler wrapping an async endpoint over domain types.
///
/// `params` that do not decode into `Req` fail with `InvalidParamsError`.
/// Failures at any stage are logged before being returned.
///
/// ```rust
/// use serde::{Deserialize, Serialize};
/// use wirerpc_json_rpc::{EndpointHandler, HandlerError, HandlerRegistry, RequestContext};
///
/// #[derive(Deserialize)]
/// struct AddRequest { a: i64, b: i64 }
///
/// #[derive(Serialize)]
/// struct AddResponse { sum: i64 }
///
/// let registry = HandlerRegistry::new().with(
///     "add",
///     EndpointHandler::new(|_ctx: RequestContext, req: AddRequest| async move {
///         Ok::<_, HandlerError>(AddResponse { sum: req.a + req.b })
///     }),
/// );
/// assert!(registry.contains("add"));
/// ```
pub struct EndpointHandler<Req, Resp, F> {
    endpoint: F,
    _types: PhantomData<fn(Req) -> Resp>,
}

impl<Req, Resp, F, Fut> EndpointHandler<Req, Resp, F>
where
    F: Fn(RequestContext, Req) -> Fut,
    Fut: Future<Output = Result<Resp, HandlerError>>,
{
    pub fn new(endpoint: F) -> Self {
        Self {
            endpoint,
            _types: PhantomData,
        }
    }
}

#[async_trait]
impl<Req, Resp, F, Fut> JsonRpcHandler for EndpointHandler<Req, Resp, F>
where
    Req: DeserializeOwned + Send + 'static,
    Resp: Serialize + Send + 'static,
    F: Fn(RequestContext, Req) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Resp, HandlerError>> + Send + 'static,
{
    async fn handle(
        &self,
        ctx: RequestContext,
        _headers: HeaderMap,
        params: RequestParams,
    ) -> Result<HandlerResponse, HandlerError> {
        let method = ctx.method().unwrap_or_default().to_string();

        let request: Req = params.decode().map_err(|err| {
            warn!(method = %method, err = ?err.data, "failed to decode params");
            HandlerError::new(err)
        })?;

        let response = (self.endpoint)(ctx, request).await.map_err(|err| {
            warn!(method = %method, err = %err, "endpoint failed");
            err
        })?;

        HandlerResponse::json(&response).map_err(|err| {
            warn!(method = %method, err = %err, "failed to encode response");
            err
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::JsonRpcErrorObject;
    use crate::error_codes;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct AddRequest {
        a: i64,
        b: i64,
    }

    #[derive(Debug, Serialize)]
    struct AddResponse {
        v: i64,
    }

    fn add_handler() -> impl JsonRpcHandler {
        EndpointHandler::new(|_ctx: RequestContext, req: AddRequest| async move {
            if req.b == 0 {
                return Err(HandlerError::new(JsonRpcErrorObject::with_message(
                    -32000i64,
                    "b must not be zero",
                )));
            }
            Ok(AddResponse { v: req.a + req.b })
        })
    }

    #[tokio::test]
    async fn test_endpoint_success() {
        let params = RequestParams::from_json(r#"{"a":1,"b":3}"#).unwrap();
        let response = add_handler()
            .handle(RequestContext::new(), HeaderMap::new(), params)
            .await
            .unwrap();
        assert_eq!(response.result.get(), r#"{"v":4}"#);
    }

    #[tokio::test]
    async fn test_bad_params_are_invalid_params() {
        let params = RequestParams::from_json(r#"{"a":"one"}"#).unwrap();
        let err = add_handler()
            .handle(RequestContext::new(), HeaderMap::new(), params)
            .await
            .unwrap_err();
        assert_eq!(err.to_error_object().code, error_codes::INVALID_PARAMS);
    }

    #[tokio::test]
    async fn test_endpoint_error_is_passed_through() {
        let params = RequestParams::from_json(r#"{"a":1,"b":0}"#).unwrap();
        let err = add_handler()
            .handle(RequestContext::new(), HeaderMap::new(), params)
            .await
            .unwrap_err();
        let object = err.to_error_object();
        assert_eq!(object.code, -32000);
        assert_eq!(object.message, "b must not be zero");
    }
}
