//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (accept loop, one task per connection)
//!     → parser.rs (request line, headers, content-length body)
//!     → request.rs (normalize path, query, headers, JSON)
//!     → [app::Dispatcher resolves and runs the handler]
//!     → response.rs (status, headers, Content-Length)
//!     → serializer.rs (bytes on the wire, then close)
//! ```

pub mod parser;
pub mod request;
pub mod response;
pub mod serializer;
pub mod server;

pub use parser::{ParseError, RequestParser};
pub use request::{Request, RequestBuilder};
pub use response::Response;
pub use server::HttpServer;
