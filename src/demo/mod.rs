//! Demo CRUD application served by the binary.
//!
//! Uses only the public request/response contract: it registers handlers on
//! a `RouterBuilder` and keeps its records in a mutex-guarded store.

pub mod handlers;
pub mod store;

pub use handlers::{router, SharedStore};
pub use store::{InMemoryUserStore, UserRecord, UserRepository};
