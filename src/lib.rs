//! Minimal HTTP/1.1 server on raw TCP sockets with a small routing layer.

pub mod app;
pub mod config;
pub mod demo;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod routing;

pub use app::{Dispatcher, Handler, Scope, ScopeKind};
pub use config::ServerConfig;
pub use http::{HttpServer, Request, Response};
pub use lifecycle::Shutdown;
pub use routing::{Router, RouterBuilder};
