use std::sync::Arc;

use http::HeaderMap;
use serde_json::Value;
use serde_json::value::RawValue;
use tracing::{debug, warn};

use crate::context::RequestContext;
use crate::error::{HandlerError, JsonRpcErrorObject};
use crate::handler::HandlerResponse;
use crate::registry::HandlerRegistry;
use crate::request::JsonRpcRequest;
use crate::response::JsonRpcResponse;
use crate::types::RequestId;

/// Shape of a successful handler result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultKind {
    Plain,
    /// An object with a non-zero integer `code`, i.e. it looks like a
    /// serialized error. It is still a result and is encoded under `result`.
    ErrorShaped,
}

/// Classify a handler result without changing how it is encoded.
pub fn classify_result(result: &RawValue) -> ResultKind {
    match serde_json::from_str::<Value>(result.get()) {
        Ok(Value::Object(map)) => match map.get("code").and_then(Value::as_i64) {
            Some(code) if code != 0 => ResultKind::ErrorShaped,
            _ => ResultKind::Plain,
        },
        _ => ResultKind::Plain,
    }
}

/// A call that ended in an error response
#[derive(Debug)]
pub struct DispatchFailure {
    /// Id to echo; `None` when the request was not decoded or had no id.
    pub id: Option<RequestId>,
    pub error: HandlerError,
}

/// Result of dispatching one call
#[derive(Debug)]
pub enum DispatchOutcome {
    /// Handler succeeded; encode and send this response.
    Response(JsonRpcResponse),
    /// Terminal failure; hand it to an error encoder.
    Failure(DispatchFailure),
    /// Accepted notification; there is no body to send.
    NoContent,
}

impl DispatchOutcome {
    fn failure(id: Option<RequestId>, error: JsonRpcErrorObject) -> Self {
        DispatchOutcome::Failure(DispatchFailure {
            id,
            error: HandlerError::new(error),
        })
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, DispatchOutcome::Failure(_))
    }
}

/// Routes decoded calls to the handlers of a [`HandlerRegistry`].
///
/// The registry is frozen when the dispatcher is built and shared behind an
/// `Arc`, so lookups from concurrent calls need no locking.
#[derive(Debug, Clone)]
pub struct JsonRpcDispatcher {
    registry: Arc<HandlerRegistry>,
}

impl JsonRpcDispatcher {
    pub fn new(registry: HandlerRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
        }
    }

    pub fn registry(&self) -> &HandlerRegistry {
        &self.registry
    }

    /// Decode, validate, route and invoke one call.
    ///
    /// `ctx` carries the transport metadata; the envelope fields are added
    /// here. Each stage is terminal on failure: undecodable bodies give
    /// `ParseError`, invalid requests `InvalidRequestError`, unknown methods
    /// `MethodNotFoundError`.
    ///
    /// Notifications are handed to a detached tokio task and the call
    /// returns [`DispatchOutcome::NoContent`] at once. The task is never
    /// awaited and its outcome is dropped, so a failing notification handler
    /// is only visible in the logs.
    ///
    /// # Panics
    ///
    /// Notifications are spawned with `tokio::spawn`, so dispatching one
    /// outside a tokio runtime panics.
    pub async fn dispatch(
        &self,
        mut ctx: RequestContext,
        headers: HeaderMap,
        body: &[u8],
    ) -> DispatchOutcome {
        let request = match JsonRpcRequest::decode(body) {
            Ok(request) => request,
            Err(err) => {
                warn!(err = %err, "rejecting undecodable request");
                return DispatchOutcome::failure(None, err.into());
            }
        };

        ctx.populate(&request);

        if let Err(err) = request.validate() {
            warn!(method = %request.method, err = %err, "rejecting invalid request");
            return DispatchOutcome::failure(request.id, err.into());
        }

        let Some(handler) = self.registry.get(&request.method) else {
            warn!(method = %request.method, "method not found");
            return DispatchOutcome::failure(request.id, JsonRpcErrorObject::method_not_found());
        };
        let handler = Arc::clone(handler);

        let JsonRpcRequest {
            method, params, id, ..
        } = request;

        let Some(id) = id else {
            debug!(method = %method, "dispatching notification");
            tokio::spawn(async move {
                if let Err(err) = handler.handle(ctx, headers, params).await {
                    debug!(method = %method, err = %err, "notification handler failed");
                }
            });
            return DispatchOutcome::NoContent;
        };

        debug!(method = %method, id = %id, "dispatching request");
        match handler.handle(ctx, headers, params).await {
            Ok(HandlerResponse { result, headers }) => {
                if classify_result(&result) == ResultKind::ErrorShaped {
                    debug!(method = %method, "handler returned an error-shaped result");
                }
                DispatchOutcome::Response(
                    JsonRpcResponse::success(Some(id), result).with_headers(headers),
                )
            }
            Err(error) => {
                debug!(method = %method, err = %error, "handler failed");
                DispatchOutcome::Failure(DispatchFailure {
                    id: Some(id),
                    error,
                })
            }
        }
    }
}
