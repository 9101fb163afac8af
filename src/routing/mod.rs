//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (method, path)
//!     → router.rs (per-method route list)
//!     → matcher.rs (segment-by-segment template match)
//!     → Return: matched Route + path params, or None
//!
//! Route Compilation (at startup):
//!     RouterBuilder::get/post/put/patch/delete
//!     → Compile templates into segment lists
//!     → Freeze as immutable Router
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - No regex in hot path (segment comparison only)
//! - Deterministic: same input always matches same route
//! - First match wins (ordered by registration)

pub mod matcher;
pub mod router;

pub use matcher::{PathTemplate, RouteError};
pub use router::{Route, RouteMatch, Router, RouterBuilder};
