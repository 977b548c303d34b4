use async_trait::async_trait;
use futures::future::BoxFuture;
use http::{HeaderMap, HeaderName, HeaderValue};
use serde::Serialize;
use serde_json::value::RawValue;

use crate::context::RequestContext;
use crate::error::HandlerError;
use crate::request::RequestParams;

/// Successful outcome of a handler: the encoded result plus headers the
/// transport should add to its response.
#[derive(Debug, Clone)]
pub struct HandlerResponse {
    pub result: Box<RawValue>,
    pub headers: HeaderMap,
}

impl HandlerResponse {
    pub fn raw(result: Box<RawValue>) -> Self {
        Self {
            result,
            headers: HeaderMap::new(),
        }
    }

    /// Encode `value` as the result.
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<Self, HandlerError> {
        let result = serde_json::value::to_raw_value(value).map_err(HandlerError::internal)?;
        Ok(Self::raw(result))
    }

    /// A `null` result, for methods with nothing to return.
    pub fn null() -> Self {
        Self::raw(RawValue::NULL.to_owned())
    }

    /// Add a response header. Repeated names keep every value.
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.append(name, value);
        self
    }
}

/// Capability invoked for one JSON-RPC method.
///
/// Handlers are transport independent: they see the request context, the
/// inbound headers and the undecoded `params`.
#[async_trait]
pub trait JsonRpcHandler: Send + Sync {
    async fn handle(
        &self,
        ctx: RequestContext,
        headers: HeaderMap,
        params: RequestParams,
    ) -> Result<HandlerResponse, HandlerError>;
}

/// Boxed future returned by closures wrapped in [`FunctionHandler`]
pub type HandlerFuture = BoxFuture<'static, Result<HandlerResponse, HandlerError>>;

/// A simple closure-based handler
pub struct FunctionHandler<F>
where
    F: Fn(RequestContext, HeaderMap, RequestParams) -> HandlerFuture + Send + Sync,
{
    handler_fn: F,
}

impl<F> FunctionHandler<F>
where
    F: Fn(RequestContext, HeaderMap, RequestParams) -> HandlerFuture + Send + Sync,
{
    pub fn new(handler_fn: F) -> Self {
        Self { handler_fn }
    }
}

#[async_trait]
impl<F> JsonRpcHandler for FunctionHandler<F>
where
    F: Fn(RequestContext, HeaderMap, RequestParams) -> HandlerFuture + Send + Sync,
{
    async fn handle(
        &self,
        ctx: RequestContext,
        headers: HeaderMap,
        params: RequestParams,
    ) -> Result<HandlerResponse, HandlerError> {
        (self.handler_fn)(ctx, headers, params).await
    }
}
