//! Invocation handlers bound into the schema.
//!
//! A handler is an opaque callable that the execution engine invokes with the
//! operation's parameters, the caller-supplied request context and a little
//! information about the request. The assembler never calls, awaits or
//! inspects handlers itself.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use annograph_core::{ClassId, OperationKind};
use futures_util::future::BoxFuture;

/// Operation parameters, exactly as supplied by the execution engine.
pub type Parameters = serde_json::Map<String, serde_json::Value>;

/// Result produced by a handler.
pub type HandlerResult = Result<serde_json::Value, HandlerError>;

/// Future returned by [`InvocationHandler::invoke`].
pub type HandlerFuture = BoxFuture<'static, HandlerResult>;

/// Information about the field being resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestInfo {
    /// Root the operation belongs to.
    pub kind: OperationKind,
    /// Name of the root field being resolved.
    pub field_name: String,
}

impl RequestInfo {
    pub fn new(kind: OperationKind, field_name: impl Into<String>) -> Self {
        Self {
            kind,
            field_name: field_name.into(),
        }
    }
}

/// Error returned by a handler. Surfaces as a GraphQL field error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerError {
    message: String,
}

impl HandlerError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for HandlerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for HandlerError {}

impl From<serde_json::Error> for HandlerError {
    fn from(err: serde_json::Error) -> Self {
        Self::new(err.to_string())
    }
}

/// Callable bound to a query or mutation.
pub trait InvocationHandler<Ctx>: Send + Sync + 'static {
    fn invoke(&self, parameters: Parameters, context: Option<Ctx>, info: RequestInfo) -> HandlerFuture;
}

impl<Ctx, F, Fut> InvocationHandler<Ctx> for F
where
    F: Fn(Parameters, Option<Ctx>, RequestInfo) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    fn invoke(&self, parameters: Parameters, context: Option<Ctx>, info: RequestInfo) -> HandlerFuture {
        Box::pin(self(parameters, context, info))
    }
}

/// Shared, type-erased handler.
pub type DynHandler<Ctx> = Arc<dyn InvocationHandler<Ctx>>;

/// Builds a handler from an async closure.
///
/// ```
/// use annograph_graphql::handler::{handler_fn, InvocationHandler};
/// use serde_json::json;
///
/// let handler = handler_fn(|parameters, _context: Option<()>, _info| async move {
///     Ok(json!({ "echo": parameters }))
/// });
/// # fn assert_handler<H: InvocationHandler<()>>(_: &H) {}
/// # assert_handler(&handler);
/// ```
pub fn handler_fn<Ctx, F, Fut>(f: F) -> impl InvocationHandler<Ctx>
where
    F: Fn(Parameters, Option<Ctx>, RequestInfo) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    f
}

/// An object whose annotated methods become operations.
///
/// The methods themselves are declared in the metadata store under the
/// controller's class id; `call` dispatches an invocation to one of them.
pub trait Controller<Ctx>: Send + Sync + 'static {
    fn class_id(&self) -> ClassId;

    fn call(
        &self,
        method: &str,
        parameters: Parameters,
        context: Option<Ctx>,
        info: RequestInfo,
    ) -> HandlerFuture;
}

/// Binds one controller method as a handler.
pub(crate) struct MethodHandler<C> {
    controller: Arc<C>,
    method: String,
}

impl<C> MethodHandler<C> {
    pub(crate) fn new(controller: Arc<C>, method: impl Into<String>) -> Self {
        Self {
            controller,
            method: method.into(),
        }
    }
}

impl<Ctx, C> InvocationHandler<Ctx> for MethodHandler<C>
where
    C: Controller<Ctx>,
{
    fn invoke(&self, parameters: Parameters, context: Option<Ctx>, info: RequestInfo) -> HandlerFuture {
        self.controller.call(&self.method, parameters, context, info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Echo;

    impl Controller<()> for Echo {
        fn class_id(&self) -> ClassId {
            ClassId::new("Echo")
        }

        fn call(
            &self,
            method: &str,
            parameters: Parameters,
            _context: Option<()>,
            info: RequestInfo,
        ) -> HandlerFuture {
            let method = method.to_string();
            Box::pin(async move {
                Ok(json!({
                    "method": method,
                    "field": info.field_name,
                    "parameters": parameters,
                }))
            })
        }
    }

    #[test]
    fn test_closure_handler() {
        let handler = handler_fn(|parameters: Parameters, context: Option<u32>, info| async move {
            Ok(json!({
                "count": parameters.len(),
                "context": context,
                "field": info.field_name,
            }))
        });

        let mut parameters = Parameters::new();
        parameters.insert("id".into(), json!("1"));
        let info = RequestInfo::new(OperationKind::Query, "user");

        let value = futures_util::FutureExt::now_or_never(handler.invoke(parameters, Some(7), info))
            .unwrap()
            .unwrap();
        assert_eq!(value, json!({"count": 1, "context": 7, "field": "user"}));
    }

    #[test]
    fn test_method_handler_dispatch() {
        let handler = MethodHandler::new(Arc::new(Echo), "users");
        let info = RequestInfo::new(OperationKind::Query, "users");

        let value = futures_util::FutureExt::now_or_never(
            InvocationHandler::<()>::invoke(&handler, Parameters::new(), None, info),
        )
        .unwrap()
        .unwrap();
        assert_eq!(value["method"], "users");
        assert_eq!(value["parameters"], json!({}));
    }

    #[test]
    fn test_handler_error() {
        let err = HandlerError::new("boom");
        assert_eq!(err.to_string(), "boom");
        assert_eq!(err.message(), "boom");
    }
}
