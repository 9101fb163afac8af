//! HTTP server: accept loop and per-connection request cycle.
//!
//! # Responsibilities
//! - Accept connections and spawn one task per connection
//! - Run parse → dispatch → serialize exactly once, then close
//! - Answer parse failures with 400 without dispatching
//! - Answer dispatcher panics with 500 instead of dropping the socket
//! - Stop accepting on shutdown and drain in-flight connections

use std::future::Future;
use std::net::SocketAddr;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures_util::FutureExt;
use tokio::io::BufReader;
use tokio::net::TcpStream;
use tokio::sync::broadcast;
use tracing::Instrument;
use uuid::Uuid;

use crate::app::dispatcher::panic_message;
use crate::app::{Dispatcher, Scope};
use crate::config::ServerConfig;
use crate::http::parser::RequestParser;
use crate::http::response::Response;
use crate::http::serializer;
use crate::net::{ConnectionGuard, ConnectionTracker, Listener, ListenerError};
use crate::routing::Router;

/// State shared by every connection task.
#[derive(Debug)]
struct ConnectionContext {
    dispatcher: Dispatcher,
    parser: RequestParser,
    read_timeout: Option<Duration>,
}

/// HTTP/1.1 server over raw TCP.
#[derive(Debug)]
pub struct HttpServer {
    config: ServerConfig,
    context: Arc<ConnectionContext>,
    tracker: ConnectionTracker,
}

impl HttpServer {
    /// Create a server for a frozen route table.
    pub fn new(config: ServerConfig, router: Router) -> Self {
        let read_timeout =
            (config.timeouts.read_secs > 0).then(|| Duration::from_secs(config.timeouts.read_secs));
        let context = ConnectionContext {
            dispatcher: Dispatcher::new(Arc::new(router)),
            parser: RequestParser::new(config.limits.clone()),
            read_timeout,
        };

        Self {
            config,
            context: Arc::new(context),
            tracker: ConnectionTracker::new(),
        }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Handle to the in-flight connection counter.
    pub fn tracker(&self) -> ConnectionTracker {
        self.tracker.clone()
    }

    /// Accept connections until a shutdown signal arrives.
    pub async fn run(
        self,
        listener: Listener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), ListenerError> {
        let addr = listener.local_addr().map_err(ListenerError::Bind)?;
        tracing::info!(
            address = %addr,
            routes = self.context.dispatcher.router().len(),
            max_body_size = self.config.limits.max_body_size,
            "Server started at http://{}",
            addr
        );

        loop {
            tokio::select! {
                _ = shutdown.recv() => {
                    tracing::info!("Shutdown signal received, no longer accepting connections");
                    break;
                }
                accepted = listener.accept() => {
                    let (stream, peer, permit) = match accepted {
                        Ok(conn) => conn,
                        Err(ListenerError::Accept(e)) => {
                            tracing::warn!(error = %e, "Accept failed");
                            continue;
                        }
                        Err(e) => return Err(e),
                    };

                    let guard = self.tracker.track();
                    let context = Arc::clone(&self.context);
                    tokio::spawn(async move {
                        let _permit = permit;
                        handle_connection(&context, stream, peer, guard).await;
                    });
                }
            }
        }

        let grace = Duration::from_secs(self.config.timeouts.shutdown_grace_secs);
        if self.tracker.wait_idle(grace).await {
            tracing::info!("All connections drained");
        } else {
            tracing::warn!(
                active = self.tracker.active_count(),
                "Shutdown grace period elapsed with connections still open"
            );
        }
        Ok(())
    }
}

async fn handle_connection(
    context: &ConnectionContext,
    mut stream: TcpStream,
    peer: SocketAddr,
    guard: ConnectionGuard,
) {
    let connection_id = guard.id();
    tracing::info!(connection_id = %connection_id, peer = %peer, "Client connected");

    let (read_half, mut write_half) = stream.split();
    let mut reader = BufReader::new(read_half);

    let parse = context.parser.parse(&mut reader);
    let parsed = match context.read_timeout {
        Some(limit) => tokio::time::timeout(limit, parse).await,
        None => Ok(parse.await),
    };

    let response = match parsed {
        Ok(Ok(request)) => {
            let span = tracing::info_span!(
                "request",
                request_id = %Uuid::new_v4(),
                connection_id = %connection_id,
                method = %request.method(),
                path = %request.path(),
            );
            guard_dispatch(context.dispatcher.dispatch(Scope::http(request)))
                .instrument(span)
                .await
        }
        Ok(Err(e)) => {
            tracing::warn!(connection_id = %connection_id, peer = %peer, error = %e, "Rejected malformed request");
            Response::bad_request()
        }
        Err(_) => {
            tracing::warn!(connection_id = %connection_id, peer = %peer, "Timed out reading request");
            Response::new(408)
        }
    };

    tracing::debug!(
        connection_id = %connection_id,
        status = response.status(),
        body_len = response.body().len(),
        "Sending response"
    );
    if let Err(e) = serializer::write_response(&mut write_half, &response).await {
        tracing::debug!(connection_id = %connection_id, error = %e, "Failed to write response");
    }
}

/// Await a dispatch, turning a panic into a 500.
async fn guard_dispatch<F>(dispatch: F) -> Response
where
    F: Future<Output = Response>,
{
    match AssertUnwindSafe(dispatch).catch_unwind().await {
        Ok(response) => response,
        Err(panic) => {
            tracing::error!(panic = panic_message(&*panic), "Dispatcher panicked");
            Response::internal_error().with_reason("Something went wrong!")
        }
    }
}
