//! HTTP host subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, tower-http layers)
//!     → request.rs (request ID assigned)
//!     → body buffered, routing::Router::dispatch
//!     → response.rs (ResponseWriter filled by the handler chain)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{request_id, UuidRequestId, X_REQUEST_ID};
pub use response::ResponseWriter;
pub use server::{HttpServer, ServerError};
