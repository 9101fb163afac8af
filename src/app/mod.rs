//! Application layer.
//!
//! # Data Flow
//! ```text
//! Scope (from http::server)
//!     → dispatcher.rs (scope type check, route lookup)
//!     → handler.rs (user code: Request → Response)
//!     → Response (back to http::server)
//! ```
//!
//! # Design Decisions
//! - The dispatcher is the only failure-isolation boundary for handlers
//! - Handlers never see a request without its path parameters

pub mod dispatcher;
pub mod handler;

pub use dispatcher::{Dispatcher, Scope, ScopeKind};
pub use handler::{Handler, HandlerFuture, SharedHandler};
