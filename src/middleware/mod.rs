//! Built-in chain middleware.
//!
//! Plain [`HandlerFunc`](crate::routing::HandlerFunc)s meant to sit in front of
//! application handlers via `Router::use_` or a group.

pub mod auth;
pub mod logger;

pub use auth::bearer_auth;
pub use logger::logger;
