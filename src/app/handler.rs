//! Handler contract between the core and application code.
//!
//! A handler is an async function from a normalized [`Request`] to a
//! [`Response`]. Failures are reported as `anyhow::Error` and turned into a
//! generic 500 by the dispatcher.

use std::future::Future;
use std::sync::Arc;

use futures_util::future::BoxFuture;

use crate::http::{Request, Response};

/// Future returned by a handler invocation.
pub type HandlerFuture = BoxFuture<'static, anyhow::Result<Response>>;

/// Shared, type-erased handler as stored in the route table.
pub type SharedHandler = Arc<dyn Handler>;

/// Application logic invoked for a matched route.
pub trait Handler: Send + Sync + 'static {
    fn call(&self, request: Request) -> HandlerFuture;
}

impl<F, Fut> Handler for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<Response>> + Send + 'static,
{
    fn call(&self, request: Request) -> HandlerFuture {
        Box::pin(self(request))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn hello(_req: Request) -> anyhow::Result<Response> {
        Ok(Response::text(200, "hello"))
    }

    #[tokio::test]
    async fn async_fn_is_a_handler() {
        let handler: SharedHandler = Arc::new(hello);
        let resp = handler.call(Request::builder("GET", "/").build()).await.unwrap();
        assert_eq!(resp.body(), b"hello");
    }

    #[tokio::test]
    async fn closure_captures_state() {
        let greeting = Arc::new(String::from("hi"));
        let handler: SharedHandler = Arc::new(move |req: Request| {
            let greeting = Arc::clone(&greeting);
            async move {
                Ok::<_, anyhow::Error>(Response::text(200, format!("{greeting} {}", req.path())))
            }
        });
        let resp = handler.call(Request::builder("GET", "/there").build()).await.unwrap();
        assert_eq!(resp.body(), b"hi /there");
    }
}
