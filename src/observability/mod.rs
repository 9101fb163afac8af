//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems emit `tracing` events with structured fields
//!     → logging.rs (EnvFilter + fmt subscriber)
//!     → stdout
//! ```
//!
//! # Design Decisions
//! - Each request runs inside a span carrying request_id and connection_id
//! - RUST_LOG overrides the configured level

pub mod logging;

pub use logging::init;
