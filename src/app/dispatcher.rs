//! Application entry point.
//!
//! # Responsibilities
//! - Accept a transport-level `Scope` from the server
//! - Resolve the route and attach path parameters
//! - Invoke the handler and isolate its failures
//!
//! # Design Decisions
//! - Always returns a `Response`; nothing escapes to the connection layer
//! - Handler errors and panics both become a generic 500
//! - Non-HTTP scopes are answered with 400 before routing

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures_util::FutureExt;

use crate::http::{Request, Response};
use crate::routing::Router;

/// Protocol of an incoming payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScopeKind {
    Http,
    /// Any protocol the dispatcher does not handle yet.
    Other(String),
}

/// Typed payload handed from the transport to the dispatcher.
#[derive(Debug, Clone)]
pub struct Scope {
    pub kind: ScopeKind,
    pub request: Request,
}

impl Scope {
    pub fn http(request: Request) -> Self {
        Self {
            kind: ScopeKind::Http,
            request,
        }
    }
}

/// Routes requests to handlers.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    router: Arc<Router>,
}

impl Dispatcher {
    pub fn new(router: Arc<Router>) -> Self {
        Self { router }
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    /// Produce the response for one scope.
    pub async fn dispatch(&self, scope: Scope) -> Response {
        let mut request = match scope.kind {
            ScopeKind::Http => scope.request,
            ScopeKind::Other(kind) => {
                tracing::warn!(scope_type = %kind, "Unsupported scope type");
                return Response::bad_request();
            }
        };

        tracing::info!(method = %request.method(), path = %request.path(), "Received request");

        let Some(matched) = self.router.resolve(request.method(), request.path()) else {
            tracing::debug!(method = %request.method(), path = %request.path(), "No route matched");
            return Response::not_found();
        };
        let handler = Arc::clone(matched.route.handler());
        let template = matched.route.template().to_string();
        request.set_path_params(matched.params);

        let outcome = AssertUnwindSafe(async move { handler.call(request).await })
            .catch_unwind()
            .await;
        match outcome {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => {
                tracing::error!(route = %template, error = %e, "Handler failed");
                Response::internal_error()
            }
            Err(panic) => {
                tracing::error!(route = %template, panic = panic_message(&*panic), "Handler panicked");
                Response::internal_error()
            }
        }
    }
}

pub(crate) fn panic_message(panic: &(dyn Any + Send)) -> &str {
    panic
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| panic.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload")
}
